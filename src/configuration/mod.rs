use std::fs;
use std::path::Path;

use serde::Deserialize;

mod error;

pub use crate::command::server::auth::AuthConfig;
pub use crate::command::server::listeners::insecure::Config as ServerConfig;
pub use error::Error;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let config: Configuration = toml::from_str(slice)?;
        Ok(config)
    }
}
