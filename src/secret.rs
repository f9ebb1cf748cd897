use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credential material read from the configuration: passwords and preshared tokens.
///
/// The value is zeroed from memory on drop and never shows up in `Debug` output, so
/// configuration structs holding it can be logged safely.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Zeroize + Default> Default for Secret<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_redacts_value() {
        let secret = Secret::from("hunter2");
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_secret_redacted_inside_struct() {
        #[derive(Debug, Deserialize)]
        struct Credentials {
            username: String,
            password: Secret<String>,
        }

        let credentials: Credentials =
            toml::from_str("username = \"admin\"\npassword = \"hunter2\"").unwrap();
        let debug_output = format!("{credentials:?}");

        assert!(debug_output.contains("admin"));
        assert!(!debug_output.contains("hunter2"));
        assert_eq!(credentials.password.expose(), "hunter2");
    }

    #[test]
    fn test_secret_default_is_empty() {
        let secret: Secret<String> = Secret::default();
        assert!(secret.is_empty());
        assert!(!Secret::from("x").is_empty());
    }
}
