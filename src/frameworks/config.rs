use serde::Deserialize;
use std::{env, fs, io, path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

// Runtime settings for the console. Defaults match a local backend.

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_FILE: &str = ".voter_console_session.json";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid API base url {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

// Optional file layer; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    session_file: Option<PathBuf>,
    request_timeout_ms: Option<u64>,
    default_page_size: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleConfig {
    pub api_base_url: Url,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub default_page_size: u32,
}

impl ConsoleConfig {
    /// Reads `CONSOLE_CONFIG` (or `console.toml` when present), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("CONSOLE_CONFIG").ok().map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let file = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            // The default file is optional; an explicitly named one is not.
            Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => None,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Self::from_sources(file.as_deref(), |key| env::var(key).ok())
    }

    // Environment values win over the file, the file wins over defaults.
    pub fn from_sources(
        file: Option<&str>,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match file {
            Some(text) => toml::from_str(text)?,
            None => FileConfig::default(),
        };

        let api_base_url = env_var("API_BASE_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let session_file = env_var("SESSION_FILE")
            .map(PathBuf::from)
            .or(file.session_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
        let request_timeout_ms = match env_var("REQUEST_TIMEOUT_MS") {
            Some(value) => parse_positive("REQUEST_TIMEOUT_MS", &value)?,
            None => file.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        };
        let default_page_size = match env_var("DEFAULT_PAGE_SIZE") {
            Some(value) => parse_positive::<u32>("DEFAULT_PAGE_SIZE", &value)?,
            None => file.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        if request_timeout_ms == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "request_timeout_ms",
                value: "0".to_string(),
            });
        }
        if default_page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "default_page_size",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_base_url: parse_base_url(&api_base_url)?,
            session_file,
            request_timeout: Duration::from_millis(request_timeout_ms),
            default_page_size,
        })
    }

    // Base url without the trailing slash the parser adds to bare hosts.
    pub fn api_base(&self) -> &str {
        self.api_base_url.as_str().trim_end_matches('/')
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!("unsupported scheme {scheme}"))),
    }
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|parsed| *parsed > T::default())
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}
