use base64::engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::Error;

pub const SECRET_LENGTH: usize = 32;
pub const SESSION_ID_LENGTH: usize = 32;

fn random_bytes(length: usize) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut buffer)
        .map_err(|error| Error::Entropy(error.to_string()))?;

    Ok(buffer)
}

/// Draws `length` bytes from the operating system entropy source and returns them base64
/// encoded.
pub fn random_secret(length: usize) -> Result<String, Error> {
    let buffer = random_bytes(length)?;
    Ok(BASE64_STANDARD.encode(buffer))
}

/// Session identifiers travel in a cookie, so they use the URL-safe alphabet.
pub fn random_session_id() -> Result<String, Error> {
    let buffer = random_bytes(SESSION_ID_LENGTH)?;
    Ok(URL_SAFE_NO_PAD.encode(buffer))
}
