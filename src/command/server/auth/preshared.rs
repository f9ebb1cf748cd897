use hyper::http::request::Parts;
use hyper::{Response, StatusCode};

use super::{status_response, AuthStrategy, Error};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;
use crate::secret::Secret;

/// Name and value of a preshared token, shared by the header and query flavours.
struct Token {
    name: String,
    value: Secret<String>,
}

impl Token {
    fn new(name: &str, value: Secret<String>) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::MissingTokenName);
        }
        if value.is_empty() {
            return Err(Error::MissingTokenValue);
        }

        Ok(Self {
            name: name.trim().to_string(),
            value,
        })
    }

    fn check(&self, presented: &str) -> Result<(), Error> {
        if presented == self.value.expose() {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }
}

/// Accepts requests carrying `Authorization: <name> <value>`.
pub struct PresharedToken {
    token: Token,
}

impl PresharedToken {
    pub fn new(name: &str, value: Secret<String>) -> Result<Self, Error> {
        Ok(Self {
            token: Token::new(name, value)?,
        })
    }
}

impl AuthStrategy for PresharedToken {
    fn name(&self) -> &'static str {
        "preshared-token"
    }

    fn login(&self, _parts: &Parts, _body: &[u8]) -> Response<ResponseBody> {
        status_response(StatusCode::NOT_FOUND)
    }

    fn authenticate(&self, parts: &Parts) -> Result<(), Error> {
        let presented = parts.header_token(&self.token.name)?;
        self.token.check(&presented)
    }
}

/// Accepts requests carrying `?<name>=<value>` in the query string.
pub struct PresharedParam {
    token: Token,
}

impl PresharedParam {
    pub fn new(name: &str, value: Secret<String>) -> Result<Self, Error> {
        Ok(Self {
            token: Token::new(name, value)?,
        })
    }
}

impl AuthStrategy for PresharedParam {
    fn name(&self) -> &'static str {
        "preshared-parameter"
    }

    fn login(&self, _parts: &Parts, _body: &[u8]) -> Response<ResponseBody> {
        status_response(StatusCode::NOT_FOUND)
    }

    fn authenticate(&self, parts: &Parts) -> Result<(), Error> {
        let presented = parts.query_token(&self.token.name)?;
        self.token.check(&presented)
    }
}

#[cfg(test)]
mod tests {
    use hyper::Request;

    use super::*;

    fn header_parts(value: &str) -> Parts {
        let request = Request::get("/status")
            .header("Authorization", value)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    fn uri_parts(uri: &str) -> Parts {
        Request::get(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_new_requires_name_and_value() {
        assert!(matches!(
            PresharedToken::new("", Secret::from("abc")),
            Err(Error::MissingTokenName)
        ));
        assert!(matches!(
            PresharedToken::new("Bearer", Secret::default()),
            Err(Error::MissingTokenValue)
        ));
        assert!(matches!(
            PresharedParam::new("  ", Secret::from("abc")),
            Err(Error::MissingTokenName)
        ));
        assert!(matches!(
            PresharedParam::new("key", Secret::default()),
            Err(Error::MissingTokenValue)
        ));
    }

    #[test]
    fn test_token_exact_match() {
        let auth = PresharedToken::new("Bearer", Secret::from("s3cr3t")).unwrap();
        assert_eq!(auth.authenticate(&header_parts("Bearer s3cr3t")), Ok(()));
    }

    #[test]
    fn test_token_mismatch() {
        let auth = PresharedToken::new("Bearer", Secret::from("s3cr3t")).unwrap();

        for value in ["Bearer s3cr3T", "Bearer s3cr3t ", "Bearer ", "Bearer s3cr3"] {
            assert_eq!(
                auth.authenticate(&header_parts(value)),
                Err(Error::Unauthorized),
                "{value}"
            );
        }
    }

    #[test]
    fn test_token_custom_scheme() {
        let auth = PresharedToken::new("Gravwell", Secret::from("s3cr3t")).unwrap();
        assert_eq!(auth.authenticate(&header_parts("Gravwell s3cr3t")), Ok(()));
        assert!(matches!(
            auth.authenticate(&header_parts("Bearer s3cr3t")),
            Err(Error::MissingAuthentication(_))
        ));
    }

    #[test]
    fn test_token_missing_header() {
        let auth = PresharedToken::new("Bearer", Secret::from("s3cr3t")).unwrap();
        assert!(matches!(
            auth.authenticate(&uri_parts("/status?Bearer=s3cr3t")),
            Err(Error::MissingAuthentication(_))
        ));
    }

    #[test]
    fn test_param_exact_match() {
        let auth = PresharedParam::new("apikey", Secret::from("s3cr3t")).unwrap();
        assert_eq!(auth.authenticate(&uri_parts("/status?apikey=s3cr3t")), Ok(()));
    }

    #[test]
    fn test_param_mismatch() {
        let auth = PresharedParam::new("apikey", Secret::from("s3cr3t")).unwrap();
        assert_eq!(
            auth.authenticate(&uri_parts("/status?apikey=wrong")),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn test_param_missing() {
        let auth = PresharedParam::new("apikey", Secret::from("s3cr3t")).unwrap();
        assert_eq!(
            auth.authenticate(&uri_parts("/status")),
            Err(Error::MissingParameter("apikey".to_string()))
        );
        assert_eq!(
            auth.authenticate(&header_parts("apikey s3cr3t")),
            Err(Error::MissingParameter("apikey".to_string()))
        );
    }

    #[test]
    fn test_param_repeated_with_empty_first_value() {
        let auth = PresharedParam::new("apikey", Secret::from("s3cr3t")).unwrap();
        assert_eq!(
            auth.authenticate(&uri_parts("/status?apikey=&apikey=s3cr3t")),
            Ok(())
        );
    }

    #[test]
    fn test_login_not_found() {
        let token = PresharedToken::new("Bearer", Secret::from("s3cr3t")).unwrap();
        let param = PresharedParam::new("apikey", Secret::from("s3cr3t")).unwrap();
        let parts = uri_parts("/login");

        assert_eq!(token.login(&parts, b"").status(), StatusCode::NOT_FOUND);
        assert_eq!(param.login(&parts, b"").status(), StatusCode::NOT_FOUND);
    }
}
