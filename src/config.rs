//! Provider configuration, loaded from an optional TOML file.
//!
//! A missing file yields `Config::default()`; API keys may come from the
//! environment (`NEWSAPI_KEY`, `GUARDIAN_API_KEY`), which takes precedence
//! over the file. Rate-limit budgets are advisory descriptions of each
//! upstream's daily allowance, not enforced by a scheduler.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration, one section per provider.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks API keys to keep them out of logs and error output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub newsapi: NewsapiConfig,
    pub guardian: GuardianConfig,
    pub bbc: BbcConfig,
}

/// Keyword-search provider settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct NewsapiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Advisory daily request budget for the free tier.
    pub rate_limit_per_day: u32,
    /// The free tier truncates results past this ceiling.
    pub max_results: u64,
    pub max_pages: u32,
    /// Source-domain allow-list pushed down as the `domains` parameter.
    pub domains: Vec<String>,
    /// TTL for this adapter's result memo, in seconds.
    pub cache_ttl_secs: u64,
}

/// Structured-search provider settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub rate_limit_per_day: u32,
}

/// RSS feed host settings. No credential: the feeds are public.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BbcConfig {
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newsapi: NewsapiConfig::default(),
            guardian: GuardianConfig::default(),
            bbc: BbcConfig::default(),
        }
    }
}

impl Default for NewsapiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2".to_string(),
            rate_limit_per_day: 100,
            max_results: 100,
            max_pages: 5,
            domains: [
                "reuters.com",
                "bloomberg.com",
                "businessinsider.com",
                "techcrunch.com",
                "theverge.com",
                "wired.com",
                "cnn.com",
                "bbc.com",
                "apnews.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            cache_ttl_secs: 300,
        }
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://content.guardianapis.com".to_string(),
            rate_limit_per_day: 500,
        }
    }
}

impl Default for BbcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://feeds.bbci.co.uk".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("newsapi", &self.newsapi)
            .field("guardian", &self.guardian)
            .field("bbc", &self.bbc)
            .finish()
    }
}

impl std::fmt::Debug for NewsapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsapiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("rate_limit_per_day", &self.rate_limit_per_day)
            .field("max_results", &self.max_results)
            .field("max_pages", &self.max_pages)
            .field("domains", &self.domains)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

impl std::fmt::Debug for GuardianConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardianConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("rate_limit_per_day", &self.rate_limit_per_day)
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Overlay environment variables on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get("NEWSAPI_KEY") {
            self.newsapi.api_key = Some(key);
        }
        if let Some(key) = get("GUARDIAN_API_KEY") {
            self.guardian.api_key = Some(key);
        }
        if let Some(url) = get("NEWSAPI_BASE_URL") {
            self.newsapi.base_url = url;
        }
        if let Some(url) = get("GUARDIAN_BASE_URL") {
            self.guardian.base_url = url;
        }
        if let Some(url) = get("BBC_RSS_URL") {
            self.bbc.base_url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.newsapi.base_url, "https://newsapi.org/v2");
        assert_eq!(config.newsapi.rate_limit_per_day, 100);
        assert_eq!(config.newsapi.max_pages, 5);
        assert!(config.newsapi.api_key.is_none());
        assert_eq!(config.guardian.rate_limit_per_day, 500);
        assert_eq!(config.bbc.base_url, "https://feeds.bbci.co.uk");
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsdesk_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.newsapi.base_url, "https://newsapi.org/v2");
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[guardian]\napi_key = \"g-key\"\n\n[newsapi]\nmax_pages = 2\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.guardian.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.newsapi.max_pages, 2);
        assert_eq!(config.newsapi.max_results, 100); // default
        assert_eq!(config.bbc.base_url, "https://feeds.bbci.co.uk"); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config.guardian.api_key = Some("from-file".into());

        config.apply_env_with(|name| match name {
            "NEWSAPI_KEY" => Some("n-key".into()),
            "GUARDIAN_API_KEY" => Some("g-key".into()),
            "BBC_RSS_URL" => Some("http://localhost:9/feeds".into()),
            _ => None,
        });

        assert_eq!(config.newsapi.api_key.as_deref(), Some("n-key"));
        assert_eq!(config.guardian.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.bbc.base_url, "http://localhost:9/feeds");
        // Untouched values keep their file/default state.
        assert_eq!(config.guardian.base_url, "https://content.guardianapis.com");
    }

    #[test]
    fn test_debug_masks_api_keys() {
        let mut config = Config::default();
        config.newsapi.api_key = Some("super-secret-newsapi".into());
        config.guardian.api_key = Some("super-secret-guardian".into());

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-newsapi"));
        assert!(!debug_output.contains("super-secret-guardian"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
