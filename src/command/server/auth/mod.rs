pub mod authenticator;
pub mod basic_auth;
pub mod clock;
pub mod cookie_session;
mod credentials;
mod disabled;
mod error;
pub mod jwt;
mod preshared;
pub mod random;

use std::fmt;
use std::sync::Arc;

use hyper::http::request::Parts;
use hyper::{Response, StatusCode, Uri};
use serde::Deserialize;
use tracing::Span;

pub use authenticator::Authenticator;
pub use basic_auth::BasicAuth;
pub use cookie_session::CookieSession;
pub use credentials::Credentials;
pub use disabled::Disabled;
pub use error::Error;
pub use jwt::JwtAuth;
pub use preshared::{PresharedParam, PresharedToken};

use crate::command::server::response_body::ResponseBody;
use crate::secret::Secret;

/// Scheme used for `Authorization` headers when no token name is configured, and the
/// scheme JWTs are always presented with.
pub const DEFAULT_TOKEN_NAME: &str = "Bearer";

/// Authentication contract shared by every strategy.
///
/// `authenticate` runs before every protected request and must return `Ok(())` to let the
/// request through. `login` is only routed to for strategies that hand out credentials
/// (JWT and cookie sessions); the others answer `404 Not Found`.
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn login(&self, parts: &Parts, body: &[u8]) -> Response<ResponseBody>;

    fn authenticate(&self, parts: &Parts) -> Result<(), Error>;

    /// `WWW-Authenticate` value sent along with a rejection, if the scheme has one.
    fn challenge(&self) -> Option<&'static str> {
        None
    }
}

pub(crate) fn status_response(status: StatusCode) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::empty());
    *response.status_mut() = status;
    response
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthType {
    None,
    Basic,
    Jwt,
    Cookie,
    PresharedToken,
    PresharedParameter,
}

impl AuthType {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Ok(AuthType::None),
            "basic" => Ok(AuthType::Basic),
            "jwt" => Ok(AuthType::Jwt),
            "cookie" => Ok(AuthType::Cookie),
            "preshared-token" => Ok(AuthType::PresharedToken),
            "preshared-parameter" => Ok(AuthType::PresharedParameter),
            _ => Err(Error::InvalidAuthType(value.to_string())),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            AuthType::None => "none",
            AuthType::Basic => "basic",
            AuthType::Jwt => "jwt",
            AuthType::Cookie => "cookie",
            AuthType::PresharedToken => "preshared-token",
            AuthType::PresharedParameter => "preshared-parameter",
        };
        f.write_str(tag)
    }
}

/// `[auth]` section of the configuration file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub auth_type: String,
    pub username: String,
    pub password: Secret<String>,
    pub login_url: String,
    pub token_name: String,
    pub token_value: Secret<String>,
}

pub type LoginPath = Option<String>;

impl AuthConfig {
    pub fn kind(&self) -> Result<AuthType, Error> {
        AuthType::parse(&self.auth_type)
    }

    /// Checks the fields required by the configured type and returns whether
    /// authentication is enabled. Fills in the default token name for preshared types.
    pub fn validate(&mut self) -> Result<bool, Error> {
        let auth_type = self.kind()?;

        match auth_type {
            AuthType::None => Ok(false),
            AuthType::Basic => {
                self.credentials(auth_type)?;
                Ok(true)
            }
            AuthType::Jwt | AuthType::Cookie => {
                self.login_path()?;
                self.credentials(auth_type)?;
                Ok(true)
            }
            AuthType::PresharedToken | AuthType::PresharedParameter => {
                if self.token_name.trim().is_empty() {
                    self.token_name = DEFAULT_TOKEN_NAME.to_string();
                }
                if self.token_value.is_empty() {
                    return Err(Error::MissingTokenValue);
                }
                Ok(true)
            }
        }
    }

    /// Path component of the login URL; the URL may be absolute or a bare path.
    ///
    /// The path must start with `/` and cannot be the root.
    pub fn login_path(&self) -> Result<String, Error> {
        if self.login_url.trim().is_empty() {
            return Err(Error::LoginUrlRequired);
        }

        let uri: Uri = self
            .login_url
            .trim()
            .parse()
            .map_err(|error: hyper::http::uri::InvalidUri| Error::InvalidLoginUrl {
                url: self.login_url.clone(),
                reason: error.to_string(),
            })?;

        let path = uri.path();
        if !path.starts_with('/') || path == "/" {
            return Err(Error::InvalidLoginUrl {
                url: self.login_url.clone(),
                reason: "login path must be a non-root absolute path".to_string(),
            });
        }

        Ok(path.to_string())
    }

    fn credentials(&self, auth_type: AuthType) -> Result<Credentials, Error> {
        Credentials::new(auth_type, &self.username, self.password.clone())
    }

    /// Builds the strategy selected by `auth_type`, along with the path its login handler
    /// must be mounted on (only for JWT and cookie sessions).
    ///
    /// `logger` is the span every strategy event is attached to; it is mandatory.
    pub fn build(
        &self,
        logger: Option<Span>,
    ) -> Result<(LoginPath, Arc<dyn AuthStrategy>), Error> {
        let Some(span) = logger else {
            return Err(Error::NilLogger);
        };

        let auth_type = self.kind()?;
        match auth_type {
            AuthType::None => Ok((None, Arc::new(Disabled))),
            AuthType::Basic => {
                let strategy = BasicAuth::new(self.credentials(auth_type)?);
                Ok((None, Arc::new(strategy)))
            }
            AuthType::Jwt => {
                let login_path = self.login_path()?;
                let strategy = JwtAuth::new(self.credentials(auth_type)?, span)?;
                Ok((Some(login_path), Arc::new(strategy)))
            }
            AuthType::Cookie => {
                let login_path = self.login_path()?;
                let strategy = CookieSession::new(self.credentials(auth_type)?, span);
                Ok((Some(login_path), Arc::new(strategy)))
            }
            AuthType::PresharedToken => {
                let strategy = PresharedToken::new(&self.token_name, self.token_value.clone())?;
                Ok((None, Arc::new(strategy)))
            }
            AuthType::PresharedParameter => {
                let strategy = PresharedParam::new(&self.token_name, self.token_value.clone())?;
                Ok((None, Arc::new(strategy)))
            }
        }
    }
}
