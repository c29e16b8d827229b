use crate::errors::ConfigError;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CACHE_PATH: &str = "data/cache.json";
const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cache_path: PathBuf,
    /// Base URL of the carbon service, e.g. `http://localhost:8000/api`.
    pub api_url: String,
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => parse_var("PORT", value)?,
            None => defaults.port,
        };
        let api_timeout = match lookup("CARBON_API_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_var("CARBON_API_TIMEOUT_SECS", value)?),
            None => defaults.api_timeout,
        };

        Ok(Self {
            port,
            cache_path: lookup("APP_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            api_url: lookup("CARBON_API_URL").unwrap_or(defaults.api_url),
            api_timeout,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
