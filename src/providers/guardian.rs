//! Structured-search adapter.
//!
//! The upstream exposes real sections and server-side pagination, so almost
//! everything pushes down: `q`, `section` (omitted for the general bucket,
//! which has no native section), an exact-day window via `from-date` plus an
//! exclusive `to-date` on the next calendar day, and `page`/`page-size`.
//! Totals are reported as-is; there is no artificial cap here.
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::category::{section_id, Category};
use crate::config::GuardianConfig;
use crate::fetch::{get_with_retry, MAX_RETRIES};
use crate::model::{Article, NewsFilter, NewsPage};
use crate::providers::{NewsProvider, ProviderError, ProviderId};

pub struct GuardianProvider {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl GuardianProvider {
    pub fn new(config: &GuardianConfig, client: Client) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(&format!(
            "{}/search",
            config.base_url.trim_end_matches('/')
        ))?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self, filter: &NewsFilter) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("api-key", self.api_key.as_deref().unwrap_or(""));
            params.append_pair("show-fields", "trailText,thumbnail");
            if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                params.append_pair("q", q);
            }
            if let Some(category) = filter.category.filter(|c| *c != Category::General) {
                params.append_pair("section", section_id(category));
            }
            if let Some(date) = filter.date {
                params.append_pair("from-date", &date.to_string());
                params.append_pair("to-date", &date.succ_opt().unwrap_or(date).to_string());
            }
            params.append_pair("page", &filter.page.to_string());
            params.append_pair("page-size", &filter.page_size.to_string());
        }
        url
    }
}

#[async_trait]
impl NewsProvider for GuardianProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Guardian
    }

    fn name(&self) -> &'static str {
        "The Guardian"
    }

    async fn fetch_news(&self, filter: &NewsFilter) -> Result<NewsPage, ProviderError> {
        let response = get_with_retry(
            &self.client,
            self.request_url(filter),
            HeaderMap::new(),
            MAX_RETRIES,
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::HttpStatus(status.as_u16()));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;
        let body = envelope.response;
        if body.status != "ok" {
            return Err(ProviderError::MalformedPayload(format!(
                "unexpected status field: {}",
                body.status
            )));
        }

        let articles = body
            .results
            .into_iter()
            .map(|raw| raw.into_article(self.name()))
            .collect();

        Ok(NewsPage {
            articles,
            has_more: body.current_page < body.pages,
            total_results: body.total,
            current_page: Some(body.current_page),
            total_pages: Some(body.pages),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    status: String,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    current_page: u32,
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    web_title: String,
    web_url: String,
    #[serde(default)]
    web_publication_date: Option<String>,
    #[serde(default)]
    section_name: Option<String>,
    #[serde(default)]
    fields: Option<RawFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    trail_text: Option<String>,
    thumbnail: Option<String>,
}

impl RawResult {
    fn into_article(self, source: &str) -> Article {
        let fields = self.fields.unwrap_or_default();
        Article {
            title: self.web_title,
            description: fields.trail_text.unwrap_or_default(),
            url: self.web_url,
            image_url: fields.thumbnail.filter(|t| !t.is_empty()),
            source: source.to_string(),
            published_at: self.web_publication_date.unwrap_or_default(),
            category: self.section_name.filter(|s| !s.is_empty()),
        }
    }
}
