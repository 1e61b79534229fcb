use color_eyre::eyre::{eyre, WrapErr};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8050";
pub const DEFAULT_TOKEN_PATH: &str = ".transit-analysis/token.json";
pub const DEFAULT_LOG_FILE: &str = ".transit-analysis/transit-analysis.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Clustering a large city can take minutes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub token_path: PathBuf,
    pub timeout: Duration,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the `TRANSIT_*` environment variables.
    pub fn from_env() -> color_eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> color_eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let api_url = get("TRANSIT_API_URL")
            .map_or(defaults.api_url, |url| url.trim_end_matches('/').to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(eyre!("TRANSIT_API_URL must be an http(s) URL, got {api_url}"));
        }

        let timeout = match get("TRANSIT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .wrap_err_with(|| format!("TRANSIT_TIMEOUT_SECS is not a number: {raw}"))?;
                if secs == 0 {
                    return Err(eyre!("TRANSIT_TIMEOUT_SECS must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        Ok(Self {
            api_url,
            token_path: get("TRANSIT_TOKEN_PATH").map_or(defaults.token_path, PathBuf::from),
            timeout,
            log_file: get("TRANSIT_LOG_FILE").map_or(defaults.log_file, PathBuf::from),
            log_level: get("TRANSIT_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}

/// Loads `.env` if present, then reads the environment.
pub fn init_app_config() -> color_eyre::Result<AppConfig> {
    dotenv().ok();
    AppConfig::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> color_eyre::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("TRANSIT_API_URL", "https://transit.example.com/"),
            ("TRANSIT_TOKEN_PATH", "/tmp/token.json"),
            ("TRANSIT_TIMEOUT_SECS", "30"),
            ("TRANSIT_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://transit.example.com");
        assert_eq!(config.token_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("TRANSIT_API_URL", "  ")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("TRANSIT_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("TRANSIT_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("TRANSIT_API_URL", "localhost:8050")]).is_err());
    }
}
