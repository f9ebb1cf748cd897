
use std::sync::Arc;

use chrono::Duration;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::http::request::Parts;
use hyper::{Response, StatusCode};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, Span};

use super::clock::{Clock, SystemClock};
use super::random::{random_secret, SECRET_LENGTH};
use super::{status_response, AuthStrategy, Credentials, Error, DEFAULT_TOKEN_NAME};
use crate::command::server::request_ext::HeaderExt;
use crate::command::server::response_body::ResponseBody;

pub const ISSUER: &str = "gravwell";

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

pub fn token_validity() -> Duration {
    Duration::hours(48)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub nbf: i64,
    pub exp: i64,
}

/// Stateless token authentication.
///
/// A successful login returns an HS256 token signed with a secret drawn when the strategy
/// is built; the secret lives only in this process, so a restart invalidates every token.
pub struct JwtAuth {
    credentials: Credentials,
    secret: String,
    clock: Arc<dyn Clock>,
    span: Span,
}

impl JwtAuth {
    pub fn new(credentials: Credentials, span: Span) -> Result<Self, Error> {
        let secret = random_secret(SECRET_LENGTH)
            .map_err(|error| Error::SecretGeneration(error.to_string()))?;

        Ok(Self {
            credentials,
            secret,
            clock: Arc::new(SystemClock),
            span,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn issue_token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = self.clock.now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            nbf: now.timestamp(),
            exp: (now + token_validity()).timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
    }

    fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        let header = decode_header(token).map_err(|error| {
            debug!(parent: &self.span, "Failed to decode JWT header: {error}");
            Error::InvalidOrExpiredToken
        })?;

        if !HMAC_ALGORITHMS.contains(&header.alg) {
            return Err(Error::UnexpectedSigningMethod(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(header.alg);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);
        validation.validate_aud = false;
        // time bounds are checked below against the injected clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let claims = decode::<Claims>(token, &key, &validation)
            .map_err(|error| {
                debug!(parent: &self.span, "JWT verification failed: {error}");
                Error::InvalidOrExpiredToken
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if claims.iss != ISSUER || now < claims.nbf || now > claims.exp {
            debug!(parent: &self.span, "JWT outside of its validity window");
            return Err(Error::InvalidOrExpiredToken);
        }

        Ok(claims)
    }
}

impl AuthStrategy for JwtAuth {
    fn name(&self) -> &'static str {
        "jwt"
    }

    fn login(&self, parts: &Parts, body: &[u8]) -> Response<ResponseBody> {
        if let Err(response) = self.credentials.check_login(parts, body, &self.span) {
            return response;
        }

        match self.issue_token() {
            Ok(token) => {
                info!(parent: &self.span, "{} Successful login", parts.remote_ip());
                let mut response = Response::new(ResponseBody::fixed(token));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
                response
            }
            Err(err) => {
                error!(parent: &self.span, "{} Bad JWT token: {err}", parts.remote_ip());
                status_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn authenticate(&self, parts: &Parts) -> Result<(), Error> {
        let token = parts.header_token(DEFAULT_TOKEN_NAME)?;

        match self.verify_token(&token) {
            Ok(_) => Ok(()),
            Err(Error::UnexpectedSigningMethod(alg)) => {
                info!(
                    parent: &self.span,
                    "{} JWT signed with unexpected method {alg}",
                    parts.remote_ip()
                );
                Err(Error::InvalidOrExpiredToken)
            }
            Err(err) => Err(err),
        }
    }
}
