pub mod auth;
mod command;
pub mod error;
mod http_server;
pub mod listeners;
mod request_ext;
mod response_body;
mod router;

pub use command::{Command, Options};
pub use error::Error;
