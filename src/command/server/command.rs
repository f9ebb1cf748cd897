use argh::FromArgs;
use tracing::{info, info_span, warn};

use super::auth::Authenticator;
use super::listeners::insecure::InsecureListener;
use crate::command::server::error::Error;
use crate::configuration::Configuration;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "server",
    description = "Run the authenticated management listener"
)]
pub struct Options {}

pub struct Command {
    listener: InsecureListener,
}

fn build_authenticator(config: &Configuration) -> Result<Authenticator, Error> {
    let mut auth_config = config.auth.clone();

    let enabled = auth_config.validate().map_err(|err| {
        let msg = format!("Invalid authentication configuration: {err}");
        Error::Initialization(msg)
    })?;

    if !enabled {
        warn!("Authentication is disabled, every request will be accepted");
    }

    let span = info_span!("auth", auth_type = %auth_config.auth_type);
    Authenticator::new(&auth_config, span).map_err(|err| {
        let msg = format!("Failed to initialize authentication: {err}");
        Error::Initialization(msg)
    })
}

impl Command {
    pub fn new(config: &Configuration) -> Result<Command, Error> {
        let authenticator = build_authenticator(config)?;

        if let Some(login_path) = authenticator.login_path() {
            info!("Login handler mounted on POST {login_path}");
        }

        let listener = InsecureListener::new(&config.server, authenticator);
        Ok(Command { listener })
    }

    pub async fn run(&self) -> Result<(), Error> {
        self.listener.serve().await
    }
}
