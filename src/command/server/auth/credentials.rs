use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use tracing::{info, Span};

use super::{status_response, AuthType, Error};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;
use crate::secret::Secret;

/// Body of a login `POST`: `username=...&password=...`.
///
/// Repeated fields are allowed; the first occurrence of each wins.
#[derive(Debug, Default)]
struct LoginForm {
    username: String,
    password: Secret<String>,
}

impl LoginForm {
    fn parse(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;

        Ok(Self {
            username: first_value(&fields, "username").to_string(),
            password: Secret::from(first_value(&fields, "password")),
        })
    }
}

fn first_value<'a>(fields: &'a [(String, String)], name: &str) -> &'a str {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map_or("", |(_, value)| value.as_str())
}

/// The single username/password pair a strategy accepts.
#[derive(Clone, Debug)]
pub struct Credentials {
    username: String,
    password: Secret<String>,
}

impl Credentials {
    pub fn new(
        auth_type: AuthType,
        username: &str,
        password: Secret<String>,
    ) -> Result<Self, Error> {
        if username.is_empty() {
            return Err(Error::MissingUsername(auth_type));
        }
        if password.is_empty() {
            return Err(Error::MissingPassword(auth_type));
        }

        Ok(Self {
            username: username.to_string(),
            password,
        })
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose() == password
    }

    /// Checks the form-encoded credentials of a login request.
    ///
    /// On failure the returned error is the response to send back: `400` when the body is
    /// not a form, `403` when the credentials do not match.
    pub fn check_login(
        &self,
        parts: &Parts,
        body: &[u8],
        span: &Span,
    ) -> Result<(), Response<ResponseBody>> {
        let form = match LoginForm::parse(body) {
            Ok(form) => form,
            Err(error) => {
                info!(parent: span, "bad login request {error}");
                return Err(status_response(StatusCode::BAD_REQUEST));
            }
        };

        if !self.matches(&form.username, form.password.expose()) {
            info!(parent: span, "{} Failed login", parts.remote_ip());
            return Err(status_response(StatusCode::FORBIDDEN));
        }

        Ok(())
    }
}
