//! newsdesk: multi-source news aggregation.
//!
//! Three heterogeneous upstreams (a keyword-search API, a structured-search
//! API, and an RSS feed host) are normalized behind one adapter trait, fanned
//! out to concurrently, and merged into a single deduplicated, filtered,
//! sorted, paginated feed.
pub mod aggregator;
pub mod cache;
pub mod category;
pub mod config;
pub mod fetch;
pub mod model;
pub mod providers;

pub use aggregator::{AggregateError, Aggregator};
pub use category::Category;
pub use config::Config;
pub use model::{Article, NewsFilter, NewsPage};
pub use providers::{build_registry, NewsProvider, ProviderError, ProviderId};
