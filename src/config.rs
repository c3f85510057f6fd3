//! Service configuration read from the environment (and `.env`, if present).

use crate::encoder::{EncodeOptions, HexColor, ImageFormat};
use std::env;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Postgres connection string; history stays in memory when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// SHA3-256 hex digest of the key required to clear history.
    pub encrypted_api_key: Option<String>,
    pub encode_options: EncodeOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = EncodeOptions::default();
        Ok(Self {
            server_address: get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into()),
            database_url: get("DATABASE_URL"),
            database_max_connections: parse(get, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            encrypted_api_key: get("ENCRYPTED_API_KEY").map(|key| key.trim().to_ascii_lowercase()),
            encode_options: EncodeOptions {
                width: parse(get, "QR_WIDTH")?.unwrap_or(defaults.width),
                margin: parse(get, "QR_MARGIN")?.unwrap_or(defaults.margin),
                dark_color: parse::<HexColor>(get, "QR_DARK_COLOR")?.unwrap_or(defaults.dark_color),
                light_color: parse::<HexColor>(get, "QR_LIGHT_COLOR")?
                    .unwrap_or(defaults.light_color),
                format: parse::<ImageFormat>(get, "QR_FORMAT")?.unwrap_or(defaults.format),
            },
        })
    }
}

fn parse<T>(get: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    get(name)
        .map(|value| {
            value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
                name: name.into(),
                reason: err.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server_address, "0.0.0.0:8080");
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.encrypted_api_key, None);
        assert_eq!(config.encode_options, EncodeOptions::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("SERVER_ADDRESS", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://localhost/qr"),
            ("ENCRYPTED_API_KEY", "ABCDEF"),
            ("QR_WIDTH", "512"),
            ("QR_MARGIN", "4"),
            ("QR_DARK_COLOR", "#112233"),
            ("QR_FORMAT", "svg"),
        ])
        .unwrap();
        assert_eq!(config.server_address, "127.0.0.1:3000");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/qr"));
        assert_eq!(config.encrypted_api_key.as_deref(), Some("abcdef"));
        assert_eq!(config.encode_options.width, 512);
        assert_eq!(config.encode_options.margin, 4);
        assert_eq!(config.encode_options.dark_color.to_string(), "#112233");
        assert_eq!(config.encode_options.light_color, HexColor::WHITE);
        assert_eq!(config.encode_options.format, ImageFormat::Svg);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("DATABASE_URL", "  "), ("QR_WIDTH", "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.encode_options.width, 300);
    }

    #[test]
    fn rejects_invalid_values() {
        for (name, value) in [
            ("QR_WIDTH", "wide"),
            ("QR_DARK_COLOR", "black"),
            ("QR_FORMAT", "gif"),
            ("DATABASE_MAX_CONNECTIONS", "-1"),
        ] {
            let err = config(&[(name, value)]).unwrap_err();
            assert!(err.to_string().contains(name), "{err}");
        }
    }
}
