use hyper::http::request::Parts;
use hyper::{Response, StatusCode};

use super::{status_response, AuthStrategy, Error};
use crate::command::server::response_body::ResponseBody;

/// Lets every request through. Selected by `auth_type = "none"` or an empty type.
#[derive(Debug, Default)]
pub struct Disabled;

impl AuthStrategy for Disabled {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn login(&self, _parts: &Parts, _body: &[u8]) -> Response<ResponseBody> {
        status_response(StatusCode::NOT_FOUND)
    }

    fn authenticate(&self, _parts: &Parts) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hyper::Request;

    use super::*;

    #[test]
    fn test_disabled_accepts_anything() {
        let request = Request::get("/status")
            .header("Authorization", "Bearer garbage")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();

        assert_eq!(Disabled.authenticate(&parts), Ok(()));
    }

    #[test]
    fn test_disabled_login_not_found() {
        let (parts, ()) = Request::post("/login").body(()).unwrap().into_parts();
        let response = Disabled.login(&parts, b"username=a&password=b");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
