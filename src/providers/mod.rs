//! Provider adapters: one per upstream, behind a common capability trait.
//!
//! The aggregator never branches on provider identity beyond a registry
//! lookup for single-source mode; everything provider-specific lives behind
//! [`NewsProvider`].
pub mod bbc;
pub mod guardian;
pub mod newsapi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::fetch::FetchError;
use crate::model::{NewsFilter, NewsPage};

pub use bbc::BbcProvider;
pub use guardian::GuardianProvider;
pub use newsapi::NewsapiProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Newsapi,
    Guardian,
    Bbc,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown provider: {0}")]
pub struct UnknownProviderId(pub String);

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Newsapi => "newsapi",
            ProviderId::Guardian => "guardian",
            ProviderId::Bbc => "bbc",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = UnknownProviderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newsapi" => Ok(ProviderId::Newsapi),
            "guardian" => Ok(ProviderId::Guardian),
            "bbc" => Ok(ProviderId::Bbc),
            other => Err(UnknownProviderId(other.to_string())),
        }
    }
}

/// Errors a provider adapter can surface. The aggregator is the one place
/// these are swallowed into an empty contribution plus a log line;
/// propagation is reserved for the all-providers-failed aggregate condition.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transient failure that outlived the retry budget (including a 429
    /// that never cleared).
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] FetchError),
    /// Non-2xx, non-429 HTTP response.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Network-level failure while reading a response body.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response body did not match the expected schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    /// A request URL could not be built from the configured base.
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Capability contract shared by all upstream adapters.
///
/// `fetch_news` translates the normalized filter into a provider-specific
/// request, executes it through the retry helper, and parses the response
/// into a normalized page.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Human-readable provider name, used as the article `source` fallback.
    fn name(&self) -> &'static str;

    async fn fetch_news(&self, filter: &NewsFilter) -> Result<NewsPage, ProviderError>;
}

/// Build the process-wide adapter registry. Constructed once at startup and
/// read-only thereafter; registration order is the merge order, so it also
/// decides which duplicate of a URL survives deduplication.
pub fn build_registry(
    config: &Config,
    client: reqwest::Client,
) -> Result<Vec<Arc<dyn NewsProvider>>, url::ParseError> {
    let cache = Arc::new(TtlCache::new(std::time::Duration::from_secs(
        config.newsapi.cache_ttl_secs,
    )));
    Ok(vec![
        Arc::new(NewsapiProvider::new(
            &config.newsapi,
            client.clone(),
            Some(cache),
        )?),
        Arc::new(GuardianProvider::new(&config.guardian, client.clone())?),
        Arc::new(BbcProvider::new(&config.bbc, client)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_ids_round_trip() {
        for id in [ProviderId::Newsapi, ProviderId::Guardian, ProviderId::Bbc] {
            assert_eq!(id.as_str().parse::<ProviderId>().unwrap(), id);
        }
        assert_eq!("BBC".parse::<ProviderId>().unwrap(), ProviderId::Bbc);
        assert!("nyt".parse::<ProviderId>().is_err());
    }

    #[test]
    fn registry_holds_all_providers_in_order() {
        let registry = build_registry(&Config::default(), reqwest::Client::new()).unwrap();
        let ids: Vec<_> = registry.iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec![ProviderId::Newsapi, ProviderId::Guardian, ProviderId::Bbc]
        );
    }
}
