//! Core value types: articles, filters, and result pages.
//!
//! Field names serialize as camelCase to match the JSON contract consumed by
//! the route layer (`articles`, `hasMore`, `totalResults`, ...).
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::providers::ProviderId;

/// A single normalized news article.
///
/// The `url` is the natural identity key: two articles with the same URL are
/// duplicates regardless of any other field, and the first one seen in
/// aggregation order wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Human-readable provider or publication name.
    pub source: String,
    /// RFC 3339 or RFC 2822 timestamp as supplied by the provider.
    pub published_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Parse `published_at` as RFC 3339, falling back to RFC 2822 (RSS
    /// feeds). Returns `None` for timestamps in neither format.
    pub fn published_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published_at)
            .or_else(|_| DateTime::parse_from_rfc2822(&self.published_at))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Sort key: unix timestamp, with unparseable dates sorting after
    /// everything else (as the oldest possible value).
    pub fn published_ts(&self) -> i64 {
        self.published_utc().map(|dt| dt.timestamp()).unwrap_or(i64::MIN)
    }
}

/// Normalized request filter, constructed once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFilter {
    /// Free-text search term.
    pub query: Option<String>,
    /// Canonical category; `None` means each provider's default bucket.
    pub category: Option<Category>,
    /// Exact-day filter (UTC calendar day).
    pub date: Option<NaiveDate>,
    /// Restrict to a single provider; `None` means all providers.
    pub source: Option<ProviderId>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

pub const DEFAULT_PAGE_SIZE: u32 = 12;

impl Default for NewsFilter {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            date: None,
            source: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NewsFilter {
    /// Stable serialization of every field, used as the TTL cache key.
    pub fn cache_key(&self) -> String {
        format!(
            "q={}|cat={}|date={}|src={}|page={}|size={}",
            self.query.as_deref().unwrap_or(""),
            self.category.map(|c| c.as_str()).unwrap_or(""),
            self.date.map(|d| d.to_string()).unwrap_or_default(),
            self.source.map(|s| s.as_str()).unwrap_or(""),
            self.page,
            self.page_size,
        )
    }
}

/// One page of results, either from a single provider or from the merged
/// aggregate. `current_page`/`total_pages` are absent for sources without
/// native pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub has_more: bool,
    pub total_results: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl NewsPage {
    pub fn empty() -> Self {
        Self::default()
    }
}
