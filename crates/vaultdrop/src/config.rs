//! Client configuration.

use std::str::FromStr;
use std::time::Duration;

use vaultdrop_core::RecipientPublicKey;

use crate::error::{Result, VaultError};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for talking to a vaultdrop server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the server, without a trailing slash.
    pub server_url: String,

    /// Upper bound on every HTTP request.
    pub timeout: Duration,

    /// Default recipient public key (hex, base64 or PEM text).
    pub recipient_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            recipient_key: None,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment. Unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("VAULTDROP_SERVER_URL") {
            config.server_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "VAULTDROP_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(VaultError::Config {
                    var: "VAULTDROP_TIMEOUT_SECS",
                    value: secs.to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(key) = lookup("VAULTDROP_RECIPIENT_KEY") {
            if !key.trim().is_empty() {
                config.recipient_key = Some(key);
            }
        }

        Ok(config)
    }

    /// Import the configured recipient key, if any.
    pub fn recipient_public_key(&self) -> Result<Option<RecipientPublicKey>> {
        self.recipient_key
            .as_deref()
            .map(RecipientPublicKey::parse)
            .transpose()
            .map_err(VaultError::from)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| VaultError::Config { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.server_url, "http://localhost:4000");
        assert!(config.recipient_public_key().unwrap().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("VAULTDROP_SERVER_URL", "https://drop.example/ "),
            ("VAULTDROP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.server_url, "https://drop.example");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        for bad in ["0", "soon", "-3"] {
            assert!(matches!(
                ClientConfig::from_lookup(lookup(&[("VAULTDROP_TIMEOUT_SECS", bad)])),
                Err(VaultError::Config { var: "VAULTDROP_TIMEOUT_SECS", .. })
            ));
        }
    }

    #[test]
    fn test_bad_recipient_key_is_key_import_error() {
        let config = ClientConfig::from_lookup(lookup(&[("VAULTDROP_RECIPIENT_KEY", "zz")])).unwrap();
        assert!(matches!(
            config.recipient_public_key(),
            Err(VaultError::Crypto(vaultdrop_core::CryptoError::KeyImport(_)))
        ));
    }
}
