use std::fmt;

use super::AuthType;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // startup: configuration
    InvalidAuthType(String),
    LoginUrlRequired,
    InvalidLoginUrl { url: String, reason: String },
    MissingUsername(AuthType),
    MissingPassword(AuthType),
    MissingTokenName,
    MissingTokenValue,
    NilLogger,
    // startup: entropy
    Entropy(String),
    SecretGeneration(String),
    // per request
    MissingAuthentication(String),
    BadCredentials,
    Unauthorized,
    SessionExpired,
    MissingParameter(String),
    InvalidOrExpiredToken,
    UnexpectedSigningMethod(String),
}

impl Error {
    /// Errors raised while checking a single request. They are answered with a 401 and
    /// never abort the service.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::MissingAuthentication(_)
                | Error::BadCredentials
                | Error::Unauthorized
                | Error::SessionExpired
                | Error::MissingParameter(_)
                | Error::InvalidOrExpiredToken
                | Error::UnexpectedSigningMethod(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidAuthType(auth_type) => {
                write!(f, "Invalid authentication type: '{auth_type}'")
            }
            Error::LoginUrlRequired => write!(f, "Authentication type requires a login URL"),
            Error::InvalidLoginUrl { url, reason } => {
                write!(f, "Invalid login URL '{url}': {reason}")
            }
            Error::MissingUsername(auth_type) => {
                write!(f, "Missing username for {auth_type} authentication")
            }
            Error::MissingPassword(auth_type) => {
                write!(f, "Missing password for {auth_type} authentication")
            }
            Error::MissingTokenName => write!(f, "Token name is invalid"),
            Error::MissingTokenValue => write!(f, "Token value cannot be empty"),
            Error::NilLogger => write!(f, "Nil logger"),
            Error::Entropy(err) => write!(f, "Failed to generate random buffer: {err}"),
            Error::SecretGeneration(err) => write!(f, "Failed to generate signing secret: {err}"),
            Error::MissingAuthentication(err) => write!(f, "Missing authentication: {err}"),
            Error::BadCredentials => write!(f, "Bad username or password"),
            Error::Unauthorized => write!(f, "Unauthorized"),
            Error::SessionExpired => write!(f, "Session expired"),
            Error::MissingParameter(name) => write!(f, "Missing {name} parameter"),
            Error::InvalidOrExpiredToken => write!(f, "invalid or expired token"),
            Error::UnexpectedSigningMethod(alg) => write!(f, "Unexpected signing method: {alg}"),
        }
    }
}

impl std::error::Error for Error {}
