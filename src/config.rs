//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::view::CategoryFilter;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Where the price server listens when the client runs on a loopback host.
pub const LOCAL_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Search term used when the query is blank.
pub const DEFAULT_QUERY: &str = "cafe buendia";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Explicit price server URL; overrides origin-based resolution
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Origin the client is served from (e.g. https://prices.example.co)
    #[serde(default)]
    pub origin: Option<String>,

    /// Search term used for blank queries
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Request timeout in seconds; a sync scrapes every retailer before answering
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Category shown after a sync
    #[serde(default)]
    pub category: CategoryFilter,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            origin: None,
            default_query: default_query(),
            timeout_secs: default_timeout_secs(),
            format: OutputFormat::Table,
            category: CategoryFilter::All,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-tracker").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("PRICE_TRACKER_BACKEND_URL") {
            self.backend_url = Some(url);
        }

        if let Ok(origin) = std::env::var("PRICE_TRACKER_ORIGIN") {
            self.origin = Some(origin);
        }

        if let Ok(timeout) = std::env::var("PRICE_TRACKER_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        self
    }

    /// Price server base URL after applying the resolution rules.
    pub fn backend_url(&self) -> String {
        if let Some(url) = self.backend_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim().trim_end_matches('/').to_string();
        }

        match self.origin.as_deref() {
            Some(origin) => resolve_backend_url(origin),
            None => LOCAL_BACKEND_URL.to_string(),
        }
    }
}

/// Loopback origins talk to the local price server; anything else is same-origin.
pub fn resolve_backend_url(origin: &str) -> String {
    let origin = origin.trim().trim_end_matches('/');

    match origin_host(origin) {
        Some(host) if is_loopback(host) => LOCAL_BACKEND_URL.to_string(),
        _ => origin.to_string(),
    }
}

fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin.split_once("://").map(|(_, rest)| rest).unwrap_or(origin);
    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit_once('@').map(|(_, host)| host).unwrap_or(authority);

    let host = if authority.starts_with('[') {
        authority.split_inclusive(']').next()?
    } else {
        authority.split(':').next()?
    };

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "[::1]"
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.backend_url.is_none());
        assert!(config.origin.is_none());
        assert_eq!(config.default_query, "cafe buendia");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.category, CategoryFilter::All);
        assert_eq!(config.backend_url(), LOCAL_BACKEND_URL);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_resolve_loopback_origins() {
        assert_eq!(resolve_backend_url("http://localhost:5500"), LOCAL_BACKEND_URL);
        assert_eq!(resolve_backend_url("http://127.0.0.1:3000/"), LOCAL_BACKEND_URL);
        assert_eq!(resolve_backend_url("http://LOCALHOST"), LOCAL_BACKEND_URL);
        assert_eq!(resolve_backend_url("http://[::1]:8080"), LOCAL_BACKEND_URL);
    }

    #[test]
    fn test_resolve_remote_origin_is_same_origin() {
        assert_eq!(
            resolve_backend_url("https://precios.example.co/"),
            "https://precios.example.co"
        );
        assert_eq!(
            resolve_backend_url("https://localhost.example.co"),
            "https://localhost.example.co"
        );
    }

    #[test]
    fn test_explicit_backend_url_wins() {
        let config = Config {
            backend_url: Some("http://10.0.0.5:9000/".to_string()),
            origin: Some("http://localhost:5500".to_string()),
            ..Config::default()
        };
        assert_eq!(config.backend_url(), "http://10.0.0.5:9000");
    }

    #[test]
    fn test_origin_used_without_backend_url() {
        let config = Config {
            origin: Some("https://precios.example.co".to_string()),
            ..Config::default()
        };
        assert_eq!(config.backend_url(), "https://precios.example.co");
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            backend_url = "http://prices.internal:8000"
            origin = "https://precios.example.co"
            default_query = "cafe sello rojo"
            timeout_secs = 60
            format = "json"
            category = "Decaf"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://prices.internal:8000"));
        assert_eq!(config.origin.as_deref(), Some("https://precios.example.co"));
        assert_eq!(config.default_query, "cafe sello rojo");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.category, CategoryFilter::Category("Decaf".to_string()));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            timeout_secs = 30
            category = "all"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.category, CategoryFilter::All);
        assert_eq!(config.default_query, "cafe buendia");
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"default_query = "leche de avena""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.default_query, "leche de avena");
    }

    #[test]
    fn test_config_with_env() {
        let orig_url = std::env::var("PRICE_TRACKER_BACKEND_URL").ok();
        let orig_timeout = std::env::var("PRICE_TRACKER_TIMEOUT").ok();

        std::env::set_var("PRICE_TRACKER_BACKEND_URL", "http://proxy:8000");
        std::env::set_var("PRICE_TRACKER_TIMEOUT", "not_a_number");

        let config = Config::new().with_env();
        assert_eq!(config.backend_url.as_deref(), Some("http://proxy:8000"));
        // Invalid values keep the default
        assert_eq!(config.timeout_secs, 120);

        match orig_url {
            Some(v) => std::env::set_var("PRICE_TRACKER_BACKEND_URL", v),
            None => std::env::remove_var("PRICE_TRACKER_BACKEND_URL"),
        }
        match orig_timeout {
            Some(v) => std::env::set_var("PRICE_TRACKER_TIMEOUT", v),
            None => std::env::remove_var("PRICE_TRACKER_TIMEOUT"),
        }
    }
}
