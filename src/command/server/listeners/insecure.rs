use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::command::server::auth::Authenticator;
use crate::command::server::error::Error;
use crate::command::server::http_server::serve_request;
use crate::command::server::listeners::{accept, build_listener};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default = "Config::default_query_timeout")]
    pub query_timeout: u64,
    #[serde(default = "Config::default_query_timeout_grace_period")]
    pub query_timeout_grace_period: u64,
}

impl Config {
    fn default_bind_address() -> IpAddr {
        IpAddr::from(Ipv4Addr::from([0; 4]))
    }

    fn default_port() -> u16 {
        8000
    }

    fn default_query_timeout() -> u64 {
        3600
    }

    fn default_query_timeout_grace_period() -> u64 {
        60
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
            port: Self::default_port(),
            query_timeout: Self::default_query_timeout(),
            query_timeout_grace_period: Self::default_query_timeout_grace_period(),
        }
    }
}

/// Plain HTTP listener; TLS is expected to be terminated in front of it.
pub struct InsecureListener {
    binding_address: SocketAddr,
    authenticator: Arc<Authenticator>,
    timeouts: Arc<[Duration; 2]>,
}

impl InsecureListener {
    pub fn new(server_config: &Config, authenticator: Authenticator) -> Self {
        let binding_address = SocketAddr::new(server_config.bind_address, server_config.port);

        let timeouts = [
            Duration::from_secs(server_config.query_timeout),
            Duration::from_secs(server_config.query_timeout_grace_period),
        ];

        Self {
            binding_address,
            authenticator: Arc::new(authenticator),
            timeouts: Arc::new(timeouts),
        }
    }

    pub async fn serve(&self) -> Result<(), Error> {
        info!(
            "Listening on {} (non-TLS, auth: {})",
            self.binding_address,
            self.authenticator.strategy_name()
        );
        let listener = build_listener(self.binding_address).await?;
        self.serve_on(&listener).await
    }

    async fn serve_on(&self, listener: &TcpListener) -> Result<(), Error> {
        loop {
            debug!("Waiting for incoming connection");
            let (tcp, remote_address) = accept(listener).await?;

            let stream = TokioIo::new(tcp);
            let authenticator = Arc::clone(&self.authenticator);
            let timeouts = Arc::clone(&self.timeouts);

            tokio::spawn(Box::pin(serve_request(
                stream,
                authenticator,
                timeouts,
                remote_address,
            )));
        }
    }
}
