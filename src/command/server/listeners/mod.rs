use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::command::server::error::Error;

pub mod insecure;

async fn build_listener(binding_address: SocketAddr) -> Result<TcpListener, Error> {
    match TcpListener::bind(binding_address).await {
        Ok(listener) => Ok(listener),
        Err(err) => {
            let msg = format!("Failed to bind to {binding_address}: {err}");
            Err(Error::Initialization(msg))
        }
    }
}

async fn accept(listener: &TcpListener) -> Result<(TcpStream, SocketAddr), Error> {
    match listener.accept().await {
        Ok((stream, remote_address)) => {
            debug!("Accepted connection from {remote_address}");
            Ok((stream, remote_address))
        }
        Err(err) => {
            let msg = format!("Failed to accept incoming connection: {err}");
            Err(Error::Execution(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_listener_picks_port() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = build_listener(addr).await.unwrap();

        let local_addr = listener.local_addr().unwrap();
        assert_eq!(local_addr.ip(), addr.ip());
        assert_ne!(local_addr.port(), 0);
    }

    #[tokio::test]
    async fn test_build_listener_port_in_use() {
        let listener = build_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let taken = listener.local_addr().unwrap();

        match build_listener(taken).await {
            Err(Error::Initialization(msg)) => {
                assert!(msg.starts_with("Failed to bind to"));
                assert!(msg.contains(&taken.to_string()));
            }
            _ => panic!("Expected Initialization error"),
        }
    }

    #[tokio::test]
    async fn test_accept_reports_peer() {
        let listener = build_listener("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let local_addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move { TcpStream::connect(local_addr).await.unwrap() });

        let (_, remote_addr) = accept(&listener).await.unwrap();
        let client = client.await.unwrap();
        assert_eq!(remote_addr, client.local_addr().unwrap());
    }
}
