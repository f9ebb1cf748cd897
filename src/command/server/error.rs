use std::fmt;

use hyper::StatusCode;
use serde_json::json;

use crate::command::server::auth;

#[derive(Debug, PartialEq)]
pub enum Error {
    Initialization(String),
    Execution(String),
    // mappable to classical HTTP responses
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Initialization(err) | Error::Execution(err) => write!(f, "{err}"),
            Error::Unauthorized(err) => write!(f, "Unauthorized: {err}"),
            Error::BadRequest(err) => write!(f, "Bad Request: {err}"),
            Error::NotFound(err) => write!(f, "Not Found: {err}"),
            Error::Internal(err) => write!(f, "Internal Server Error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<auth::Error> for Error {
    fn from(error: auth::Error) -> Self {
        if error.is_request_error() {
            // the precise cause stays in the logs
            return Error::Unauthorized("authentication required".to_string());
        }

        match error {
            auth::Error::Entropy(msg) | auth::Error::SecretGeneration(msg) => {
                Error::Internal(msg)
            }
            error => Error::Initialization(error.to_string()),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Initialization(_) | Error::Execution(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn as_json(&self) -> serde_json::Value {
        let (code, message) = match self {
            Error::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            Error::BadRequest(msg) => ("BAD_REQUEST", msg),
            Error::NotFound(msg) => ("NOT_FOUND", msg),
            Error::Initialization(msg) | Error::Execution(msg) | Error::Internal(msg) => {
                ("INTERNAL_SERVER_ERROR", msg)
            }
        };

        json!({
            "errors": [{
                "code": code,
                "message": message,
            }]
        })
    }
}
