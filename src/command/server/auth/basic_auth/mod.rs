
use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use tracing::{debug, instrument};

use super::{status_response, AuthStrategy, Credentials, Error};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;

/// HTTP Basic authentication against a single configured user.
///
/// Passwords are compared in clear: the listener is expected to sit behind HTTPS.
pub struct BasicAuth {
    credentials: Credentials,
}

impl BasicAuth {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl AuthStrategy for BasicAuth {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn login(&self, _parts: &Parts, _body: &[u8]) -> Response<ResponseBody> {
        status_response(StatusCode::NOT_FOUND)
    }

    #[instrument(skip(self, parts))]
    fn authenticate(&self, parts: &Parts) -> Result<(), Error> {
        let Some((username, password)) = parts.basic_auth() else {
            let msg = "no basic credentials".to_string();
            return Err(Error::MissingAuthentication(msg));
        };

        if self.credentials.matches(&username, &password) {
            Ok(())
        } else {
            debug!("Basic credentials rejected for user '{username}'");
            Err(Error::BadCredentials)
        }
    }

    fn challenge(&self) -> Option<&'static str> {
        Some(r#"Basic realm="Ingester", charset="UTF-8""#)
    }
}
