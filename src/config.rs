//! Application configuration loaded from environment variables.

use crate::catalog::amazon::{AmazonCredentials, Country};
use std::{fmt, net::SocketAddr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Amazon PA-API settings. Credentials stay optional here so the server can
/// still start (and answer non-catalog tools) without them.
#[derive(Clone)]
pub struct AmazonConfig {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub associate_tag: Option<String>,
    pub country: Country,
    pub request_timeout_secs: u64,
}

impl fmt::Debug for AmazonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmazonConfig")
            .field("api_key", &self.api_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("associate_tag", &self.associate_tag)
            .field("country", &self.country)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AmazonConfig {
    /// Returns complete credentials, or the list of missing variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming every absent variable.
    pub fn credentials(&self) -> Result<AmazonCredentials, ConfigError> {
        match (&self.api_key, &self.secret_key, &self.associate_tag) {
            (Some(access_key), Some(secret_key), Some(partner_tag)) => Ok(AmazonCredentials {
                access_key: access_key.clone(),
                secret_key: secret_key.clone(),
                partner_tag: partner_tag.clone(),
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("AMAZON_API_KEY", &self.api_key),
                    ("AMAZON_SECRET_KEY", &self.secret_key),
                    ("AMAZON_ASSOCIATE_TAG", &self.associate_tag),
                ]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(ConfigError::MissingEnvVar(missing.join(", ")))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub cache_ttl_secs: u64,
    pub amazon: AmazonConfig,
}

/// Load configuration, reading a `.env` file first if present.
///
/// # Errors
///
/// Returns [`ConfigError`] if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the process environment so tests
/// can use a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let bind_addr = or_default("MCP_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("MCP_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("MCP_LOG_LEVEL", "info");
    let cache_ttl_secs = or_default("MCP_CACHE_TTL_SECS", "3600")
        .parse::<u64>()
        .map_err(|e| invalid("MCP_CACHE_TTL_SECS", e.to_string()))?;

    let country = or_default("AMAZON_COUNTRY", "ES")
        .parse::<Country>()
        .map_err(|e| invalid("AMAZON_COUNTRY", e))?;
    let request_timeout_secs = or_default("AMAZON_REQUEST_TIMEOUT_SECS", "10")
        .parse::<u64>()
        .map_err(|e| invalid("AMAZON_REQUEST_TIMEOUT_SECS", e.to_string()))?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        cache_ttl_secs,
        amazon: AmazonConfig {
            api_key: optional("AMAZON_API_KEY"),
            secret_key: optional("AMAZON_SECRET_KEY"),
            associate_tag: optional("AMAZON_ASSOCIATE_TAG"),
            country,
            request_timeout_secs,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        build_app_config(|key| map.get(key).cloned().ok_or(std::env::VarError::NotPresent))
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.amazon.country, Country::Spain);
        assert_eq!(config.amazon.request_timeout_secs, 10);
    }

    #[test]
    fn missing_credentials_are_listed() {
        let config = config_from(&[("AMAZON_API_KEY", "AKID"), ("AMAZON_SECRET_KEY", " ")]).unwrap();

        assert_eq!(
            config.amazon.credentials().unwrap_err(),
            ConfigError::MissingEnvVar("AMAZON_SECRET_KEY, AMAZON_ASSOCIATE_TAG".into())
        );
    }

    #[test]
    fn complete_credentials_are_returned() {
        let config = config_from(&[
            ("AMAZON_API_KEY", "AKID"),
            ("AMAZON_SECRET_KEY", "secret"),
            ("AMAZON_ASSOCIATE_TAG", "tienda-21"),
            ("AMAZON_COUNTRY", "de"),
        ])
        .unwrap();

        let creds = config.amazon.credentials().unwrap();
        assert_eq!(creds.partner_tag, "tienda-21");
        assert_eq!(config.amazon.country, Country::Germany);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("MCP_CACHE_TTL_SECS", "soon")]),
            Err(ConfigError::InvalidEnvVar { var, .. }) if var == "MCP_CACHE_TTL_SECS"
        ));
        assert!(matches!(
            config_from(&[("AMAZON_COUNTRY", "XX")]),
            Err(ConfigError::InvalidEnvVar { var, .. }) if var == "AMAZON_COUNTRY"
        ));
        assert!(config_from(&[("MCP_BIND_ADDR", "nowhere")]).is_err());
    }
}
