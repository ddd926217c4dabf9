//! Keyword-search adapter.
//!
//! Builds a boolean query (free text AND-ed with OR-joined category
//! synonyms), restricts results to an allow-list of source domains, and caps
//! the reported totals at the free tier's effective ceiling: the upstream
//! claims thousands of results but truncates access past 100 articles /
//! 5 pages. Results are memoized per filter through an optional TTL cache,
//! since this upstream has the scarcest daily budget.
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::cache::TtlCache;
use crate::category::{keyword_synonyms, Category};
use crate::config::NewsapiConfig;
use crate::fetch::{get_with_retry, MAX_RETRIES};
use crate::model::{Article, NewsFilter, NewsPage};
use crate::providers::{NewsProvider, ProviderError, ProviderId};

pub struct NewsapiProvider {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    headers: HeaderMap,
    domains: String,
    max_results: u64,
    max_pages: u32,
    cache: Option<Arc<TtlCache>>,
}

impl NewsapiProvider {
    pub fn new(
        config: &NewsapiConfig,
        client: Client,
        cache: Option<Arc<TtlCache>>,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/everything",
            config.base_url.trim_end_matches('/')
        ))?;

        // The key also travels as a header; a key with non-header characters
        // simply stays query-only.
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref() {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert("x-api-key", value);
            }
        }

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            headers,
            domains: config.domains.join(","),
            max_results: config.max_results,
            max_pages: config.max_pages,
            cache,
        })
    }

    /// Boolean-AND of the parenthesized free-text query and the OR-joined
    /// category synonyms. The upstream rejects empty queries, so with neither
    /// present we fall back to the general-bucket synonym list.
    fn build_query(&self, filter: &NewsFilter) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            parts.push(format!("({q})"));
        }
        if let Some(category) = filter.category {
            parts.push(format!("({})", keyword_synonyms(category).join(" OR ")));
        }
        if parts.is_empty() {
            return format!("({})", keyword_synonyms(Category::General).join(" OR "));
        }
        parts.join(" AND ")
    }

    fn request_url(&self, filter: &NewsFilter) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("apiKey", self.api_key.as_deref().unwrap_or(""));
            params.append_pair("language", "en");
            params.append_pair("q", &self.build_query(filter));
            if !self.domains.is_empty() {
                params.append_pair("domains", &self.domains);
            }
            if let Some(date) = filter.date {
                params.append_pair("from", &format!("{date}T00:00:00Z"));
                params.append_pair("to", &format!("{date}T23:59:59Z"));
            }
            params.append_pair("page", &filter.page.to_string());
            params.append_pair("pageSize", &filter.page_size.to_string());
        }
        url
    }
}

#[async_trait]
impl NewsProvider for NewsapiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Newsapi
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }

    async fn fetch_news(&self, filter: &NewsFilter) -> Result<NewsPage, ProviderError> {
        let cache_key = filter.cache_key();
        if let Some(page) = self.cache.as_ref().and_then(|c| c.get(&cache_key)) {
            tracing::debug!(key = %cache_key, "serving keyword-search page from cache");
            return Ok(page);
        }

        let response = get_with_retry(
            &self.client,
            self.request_url(filter),
            self.headers.clone(),
            MAX_RETRIES,
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;
        if body.status != "ok" {
            return Err(ProviderError::MalformedPayload(format!(
                "unexpected status field: {}",
                body.status
            )));
        }

        let stamped_category = filter.category.map(|c| c.as_str().to_string());
        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .filter_map(|raw| raw.into_article(self.name(), stamped_category.clone()))
            .collect();

        // Free-tier ceiling: trust the smaller of upstream's claim and the cap.
        let total_results = body.total_results.min(self.max_results);
        let page_size = u64::from(filter.page_size.max(1));
        let total_pages = (total_results.div_ceil(page_size) as u32).min(self.max_pages);

        let page = NewsPage {
            articles,
            has_more: filter.page < total_pages,
            total_results,
            current_page: Some(filter.page),
            total_pages: Some(total_pages),
        };

        if let Some(cache) = &self.cache {
            cache.put(&cache_key, page.clone());
        }
        Ok(page)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: RawSource,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl RawArticle {
    /// Articles missing title, description, or publish date are dropped
    /// before mapping; the upstream routinely returns "[Removed]" stubs with
    /// those fields nulled out.
    fn into_article(self, fallback_source: &str, category: Option<String>) -> Option<Article> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let description = self.description.filter(|d| !d.is_empty())?;
        let published_at = self.published_at.filter(|p| !p.is_empty())?;
        let url = self.url.filter(|u| !u.is_empty())?;
        Some(Article {
            title,
            description,
            url,
            image_url: self.url_to_image.filter(|u| !u.is_empty()),
            source: self
                .source
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_source.to_string()),
            published_at,
            category,
        })
    }
}
