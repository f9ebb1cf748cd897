use std::{fmt, io};

use crate::command::server;
use crate::configuration;

#[derive(Debug)]
pub enum Error {
    IO(io::Error),
    Configuration(configuration::Error),
    Server(server::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IO(err) => write!(f, "IO error: {err}"),
            Error::Configuration(err) => write!(f, "Configuration error: {err}"),
            Error::Server(err) => write!(f, "Server error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IO(err)
    }
}

impl From<configuration::Error> for Error {
    fn from(err: configuration::Error) -> Self {
        Error::Configuration(err)
    }
}

impl From<server::Error> for Error {
    fn from(err: server::Error) -> Self {
        Error::Server(err)
    }
}
