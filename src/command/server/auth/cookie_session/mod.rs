mod store;

use std::sync::Arc;
use std::time::SystemTime;

use hyper::header::{HeaderValue, InvalidHeaderValue, SET_COOKIE};
use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use tracing::{debug, error, info, Span};

pub use store::SessionStore;

use super::clock::{Clock, SystemClock};
use super::jwt::token_validity;
use super::random::random_session_id;
use super::{status_response, AuthStrategy, Credentials, Error};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;

pub const COOKIE_NAME: &str = "_gravauth";

/// Server-side sessions handed out as an opaque cookie.
///
/// Sessions only live in memory: they are lost on restart, and are not shared between
/// listeners.
pub struct CookieSession {
    credentials: Credentials,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
    span: Span,
}

impl CookieSession {
    pub fn new(credentials: Credentials, span: Span) -> Self {
        Self {
            credentials,
            sessions: SessionStore::new(),
            clock: Arc::new(SystemClock),
            span,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

fn session_cookie(id: &str, expires_at: SystemTime) -> Result<HeaderValue, InvalidHeaderValue> {
    let cookie = format!(
        "{COOKIE_NAME}={id}; Path=/; Expires={}; HttpOnly",
        httpdate::fmt_http_date(expires_at)
    );

    HeaderValue::from_str(&cookie)
}

impl AuthStrategy for CookieSession {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn login(&self, parts: &Parts, body: &[u8]) -> Response<ResponseBody> {
        if let Err(response) = self.credentials.check_login(parts, body, &self.span) {
            return response;
        }

        let now = self.clock.now();
        let expires_at = now + token_validity();

        let id = match random_session_id() {
            Ok(id) => id,
            Err(err) => {
                error!(parent: &self.span, "Failed to generate cookie: {err}");
                return status_response(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        let cookie = match session_cookie(&id, expires_at.into()) {
            Ok(cookie) => cookie,
            Err(err) => {
                error!(parent: &self.span, "Failed to build session cookie: {err}");
                return status_response(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        self.sessions.insert(id, expires_at, now);
        info!(parent: &self.span, "{} Successful login", parts.remote_ip());
        debug!(parent: &self.span, "{} active sessions", self.sessions.len());

        let mut response = status_response(StatusCode::OK);
        response.headers_mut().insert(SET_COOKIE, cookie);
        response
    }

    fn authenticate(&self, parts: &Parts) -> Result<(), Error> {
        let id = match parts.cookie(COOKIE_NAME) {
            Some(id) if !id.is_empty() => id,
            _ => {
                let msg = "invalid cookie".to_string();
                return Err(Error::MissingAuthentication(msg));
            }
        };

        self.sessions.check(&id, self.clock.now())
    }
}
