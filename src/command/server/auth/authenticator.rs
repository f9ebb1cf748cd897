use std::sync::Arc;

use hyper::http::request::Parts;
use hyper::Response;
use tracing::{info, instrument, Span};

use super::{AuthConfig, AuthStrategy, Error};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;

/// Front door of the listener: owns the configured strategy and the path its login
/// handler is mounted on.
pub struct Authenticator {
    strategy: Arc<dyn AuthStrategy>,
    login_path: Option<String>,
    span: Span,
}

impl Authenticator {
    pub fn new(config: &AuthConfig, span: Span) -> Result<Self, Error> {
        let (login_path, strategy) = config.build(Some(span.clone()))?;

        Ok(Self {
            strategy,
            login_path,
            span,
        })
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn login_path(&self) -> Option<&str> {
        self.login_path.as_deref()
    }

    pub fn challenge(&self) -> Option<&'static str> {
        self.strategy.challenge()
    }

    pub fn login(&self, parts: &Parts, body: &[u8]) -> Response<ResponseBody> {
        self.strategy.login(parts, body)
    }

    #[instrument(skip(self, parts), fields(auth_method = self.strategy.name()))]
    pub fn authenticate_request(&self, parts: &Parts) -> Result<(), Error> {
        self.strategy.authenticate(parts).inspect_err(|error| {
            info!(
                parent: &self.span,
                "{} {} authentication rejected: {error}",
                parts.remote_ip(),
                self.strategy.name()
            );
        })
    }
}
