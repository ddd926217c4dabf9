//! Fan-out aggregation across the provider registry.
//!
//! One logical request issues independent calls to every adapter, joined
//! with an all-complete combinator: a provider failure never aborts the
//! others, it just contributes zero articles and a warn log. The merged list
//! is deduplicated by URL (first occurrence wins), defensively re-filtered,
//! sorted by publish date, and paginated. The only error this layer
//! propagates is the total-outage case, so callers can tell "no matching
//! articles" apart from "every upstream is down".
use futures::future;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::model::{Article, NewsFilter, NewsPage};
use crate::providers::NewsProvider;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    /// Every provider selected for the request failed.
    #[error("all providers failed")]
    AllProvidersFailed,
    /// Single-source mode named a provider that is not registered.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

pub struct Aggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
}

impl Aggregator {
    /// The registry is fixed at construction; its order is the merge order.
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self { providers }
    }

    pub async fn get_news(&self, filter: &NewsFilter) -> Result<NewsPage, AggregateError> {
        if let Some(id) = filter.source {
            let provider = self
                .providers
                .iter()
                .find(|p| p.id() == id)
                .ok_or_else(|| AggregateError::UnknownProvider(id.to_string()))?;
            return match provider.fetch_news(filter).await {
                Ok(page) => Ok(page),
                Err(e) => {
                    tracing::warn!(provider = %id, error = %e, "provider fetch failed");
                    Err(AggregateError::AllProvidersFailed)
                }
            };
        }

        let outcomes = future::join_all(
            self.providers
                .iter()
                .map(|p| async move { (p.id(), p.fetch_news(filter).await) }),
        )
        .await;

        let mut merged = Vec::new();
        let mut failures = 0usize;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(page) => merged.extend(page.articles),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(provider = %id, error = %e, "provider fetch failed");
                }
            }
        }
        if !self.providers.is_empty() && failures == self.providers.len() {
            return Err(AggregateError::AllProvidersFailed);
        }

        let mut articles = apply_filters(dedupe_by_url(merged), filter);
        sort_by_published_desc(&mut articles);
        Ok(paginate(articles, filter.page, filter.page_size))
    }
}

/// Drop later duplicates of a URL, regardless of which provider produced
/// them; the first occurrence in merge order wins.
fn dedupe_by_url(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect()
}

/// Defensive second pass over filters the adapters already push down where
/// they can. Idempotent by construction: an article that survived adapter
/// filtering also survives this pass, notably articles without a category
/// (the feed adapter already selected them by feed path).
fn apply_filters(mut articles: Vec<Article>, filter: &NewsFilter) -> Vec<Article> {
    if let Some(category) = filter.category {
        articles.retain(|a| match a.category.as_deref() {
            Some(c) => c.eq_ignore_ascii_case(category.as_str()),
            None => true,
        });
    }
    if let Some(date) = filter.date {
        articles.retain(|a| a.published_utc().map(|dt| dt.date_naive()) == Some(date));
    }
    if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let needle = query.to_lowercase();
        articles.retain(|a| {
            a.title.to_lowercase().contains(&needle)
                || a.description.to_lowercase().contains(&needle)
        });
    }
    articles
}

/// Most recent first; the sort is stable, so equal timestamps keep their
/// merge order.
fn sort_by_published_desc(articles: &mut [Article]) {
    articles.sort_by_key(|a| std::cmp::Reverse(a.published_ts()));
}

fn paginate(articles: Vec<Article>, page: u32, page_size: u32) -> NewsPage {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = articles.len();
    let start = (page as usize - 1) * page_size as usize;
    let page_articles: Vec<Article> = articles
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    NewsPage {
        articles: page_articles,
        has_more: (page as usize) * (page_size as usize) < total,
        total_results: total as u64,
        current_page: Some(page),
        total_pages: Some(total.div_ceil(page_size as usize) as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn article(url: &str, published_at: &str) -> Article {
        Article {
            title: format!("title {url}"),
            description: "description".into(),
            url: url.into(),
            image_url: None,
            source: "test".into(),
            published_at: published_at.into(),
            category: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let a = article("https://x/1", "2024-05-01T00:00:00Z");
        let b = article("https://x/1", "2024-05-02T00:00:00Z");
        let c = article("https://x/2", "2024-05-03T00:00:00Z");
        let out = dedupe_by_url(vec![a.clone(), b, c.clone()]);
        assert_eq!(out, vec![a, c]);
    }

    #[test]
    fn post_filtering_is_idempotent() {
        let filter = NewsFilter {
            query: Some("title".into()),
            category: Some(Category::Technology),
            date: Some(chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            ..NewsFilter::default()
        };
        let mut tagged = article("https://x/1", "2024-05-01T08:00:00Z");
        tagged.category = Some("Technology".into());
        let untagged = article("https://x/2", "2024-05-01T09:00:00Z");
        let wrong_day = article("https://x/3", "2024-04-30T09:00:00Z");
        let mut wrong_section = article("https://x/4", "2024-05-01T10:00:00Z");
        wrong_section.category = Some("sport".into());

        let once = apply_filters(vec![tagged, untagged, wrong_day, wrong_section], &filter);
        let twice = apply_filters(once.clone(), &filter);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2); // tagged match + category-less pass
    }

    #[test]
    fn articles_without_category_pass_the_category_filter() {
        let filter = NewsFilter {
            category: Some(Category::World),
            ..NewsFilter::default()
        };
        let out = apply_filters(vec![article("https://x/1", "2024-05-01T00:00:00Z")], &filter);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn sorts_most_recent_first() {
        let mut articles = vec![
            article("https://x/jan", "2024-01-01T00:00:00Z"),
            article("https://x/mar", "2024-03-01T00:00:00Z"),
            article("https://x/feb", "2024-02-01T00:00:00Z"),
        ];
        sort_by_published_desc(&mut articles);
        let urls: Vec<_> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/mar", "https://x/feb", "https://x/jan"]);
    }

    #[test]
    fn equal_timestamps_keep_merge_order() {
        let mut articles = vec![
            article("https://x/a", "2024-01-01T00:00:00Z"),
            article("https://x/b", "2024-01-01T00:00:00Z"),
            article("https://x/newer", "2024-02-01T00:00:00Z"),
        ];
        sort_by_published_desc(&mut articles);
        let urls: Vec<_> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/newer", "https://x/a", "https://x/b"]);
    }

    #[test]
    fn unparseable_dates_sort_last() {
        let mut articles = vec![
            article("https://x/bad", "not a date"),
            article("https://x/good", "2024-01-01T00:00:00Z"),
        ];
        sort_by_published_desc(&mut articles);
        assert_eq!(articles[0].url, "https://x/good");
    }

    #[test]
    fn paginate_slices_and_labels_the_page() {
        let articles: Vec<_> = (0..30)
            .map(|i| article(&format!("https://x/{i}"), "2024-01-01T00:00:00Z"))
            .collect();
        let page = paginate(articles, 2, 12);
        assert_eq!(page.articles.len(), 12);
        assert_eq!(page.articles[0].url, "https://x/12");
        assert_eq!(page.total_results, 30);
        assert_eq!(page.current_page, Some(2));
        assert_eq!(page.total_pages, Some(3));
        assert!(page.has_more);
    }

    proptest! {
        #[test]
        fn pagination_contract(len in 0usize..100, page in 1u32..10, size in 1u32..20) {
            let articles: Vec<_> = (0..len)
                .map(|i| article(&format!("https://x/{i}"), "2024-01-01T00:00:00Z"))
                .collect();
            let result = paginate(articles, page, size);

            let start = (page as usize - 1) * size as usize;
            let expected_len = len.saturating_sub(start).min(size as usize);
            prop_assert_eq!(result.articles.len(), expected_len);
            prop_assert_eq!(result.has_more, (page as usize) * (size as usize) < len);
            prop_assert_eq!(result.total_results, len as u64);
        }
    }
}
