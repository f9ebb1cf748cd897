use std::net::SocketAddr;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hyper::header::{AsHeaderName, AUTHORIZATION, COOKIE};
use hyper::http::request::Parts;

use crate::command::server::auth::Error;

static BASIC_PREFIX: &str = "Basic ";

pub trait HeaderExt {
    fn get_header<K: AsHeaderName>(&self, header: K) -> Option<String>;
    fn header_token(&self, scheme: &str) -> Result<String, Error>;
    fn query_token(&self, name: &str) -> Result<String, Error>;
    fn basic_auth(&self) -> Option<(String, String)>;
    fn cookie(&self, name: &str) -> Option<String>;
    fn remote_ip(&self) -> String;
}

impl HeaderExt for Parts {
    fn get_header<K>(&self, header: K) -> Option<String>
    where
        K: AsHeaderName,
    {
        self.headers
            .get(header)
            .and_then(|header| header.to_str().ok())
            .map(ToString::to_string)
    }

    /// Returns the credential of an `Authorization: <scheme> <credential>` header.
    fn header_token(&self, scheme: &str) -> Result<String, Error> {
        if scheme.is_empty() {
            let msg = "empty token name".to_string();
            return Err(Error::MissingAuthentication(msg));
        }

        let Some(authorization) = self.get_header(AUTHORIZATION) else {
            let msg = "missing Authorization header value".to_string();
            return Err(Error::MissingAuthentication(msg));
        };

        let prefix = format!("{scheme} ");
        match authorization.strip_prefix(&prefix) {
            Some(token) => Ok(token.to_string()),
            None => {
                let msg = "invalid authorization token name".to_string();
                Err(Error::MissingAuthentication(msg))
            }
        }
    }

    /// Returns the first non-empty value of the `name` query parameter.
    fn query_token(&self, name: &str) -> Result<String, Error> {
        let missing = || Error::MissingParameter(name.to_string());

        if name.is_empty() {
            return Err(missing());
        }

        let query = self.uri.query().ok_or_else(missing)?;
        let params: Vec<(String, String)> =
            serde_urlencoded::from_str(query).map_err(|_| missing())?;

        params
            .into_iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value)
            .ok_or_else(missing)
    }

    fn basic_auth(&self) -> Option<(String, String)> {
        let authorization = self.get_header(AUTHORIZATION)?;

        let prefix = authorization.get(..BASIC_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(BASIC_PREFIX) {
            return None;
        }

        let value = &authorization[BASIC_PREFIX.len()..];
        let value = BASE64_STANDARD.decode(value).ok()?;
        let value = String::from_utf8(value).ok()?;

        let (username, password) = value.split_once(':')?;
        Some((username.to_string(), password.to_string()))
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim_matches('"').to_string())
    }

    fn remote_ip(&self) -> String {
        self.extensions
            .get::<SocketAddr>()
            .map_or_else(|| "-".to_string(), |address| address.ip().to_string())
    }
}
