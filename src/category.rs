//! Canonical topic categories and the per-provider vocabulary maps.
//!
//! Each provider speaks its own taxonomy: the keyword-search upstream wants
//! OR-able synonym lists, the structured-search upstream wants a section id,
//! and the feed host partitions by URL path. The maps are exhaustive matches,
//! so a missing entry is a compile error rather than a runtime one.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Business,
    Culture,
    Wellness,
    Science,
    Sport,
    Technology,
    World,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 8] = [
        Category::General,
        Category::Business,
        Category::Culture,
        Category::Wellness,
        Category::Science,
        Category::Sport,
        Category::Technology,
        Category::World,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Culture => "culture",
            Category::Wellness => "wellness",
            Category::Science => "science",
            Category::Sport => "sport",
            Category::Technology => "technology",
            Category::World => "world",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Category::General),
            "business" => Ok(Category::Business),
            "culture" => Ok(Category::Culture),
            "wellness" => Ok(Category::Wellness),
            "science" => Ok(Category::Science),
            "sport" => Ok(Category::Sport),
            "technology" => Ok(Category::Technology),
            "world" => Ok(Category::World),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Keyword synonyms for the keyword-search provider, OR-joined into its
/// boolean query. The general bucket doubles as the canned fallback query
/// when the caller supplies neither free text nor a category.
pub fn keyword_synonyms(category: Category) -> &'static [&'static str] {
    match category {
        Category::General => &["news", "breaking", "world"],
        Category::Business => &["business", "economy", "market", "finance", "trade"],
        Category::Culture => &["entertainment", "movie", "music", "celebrity", "culture"],
        Category::Wellness => &["health", "medical", "medicine", "healthcare"],
        Category::Science => &["science", "research", "discovery", "space"],
        Category::Sport => &["sport", "sports", "game", "match", "tournament"],
        Category::Technology => &["tech", "technology", "digital", "software", "cyber"],
        Category::World => &["world", "international", "global", "foreign"],
    }
}

/// Section identifier for the structured-search provider. The general bucket
/// carries no native section filter; the adapter omits the parameter.
pub fn section_id(category: Category) -> &'static str {
    match category {
        Category::General => "general",
        Category::Business => "business",
        Category::Culture => "culture",
        Category::Wellness => "wellness",
        Category::Science => "science",
        Category::Sport => "sport",
        Category::Technology => "technology",
        Category::World => "world",
    }
}

/// Feed path on the RSS host. Feeds are category-partitioned upstream, so
/// this is the only category pushdown the feed provider has.
pub fn feed_path(category: Category) -> &'static str {
    match category {
        Category::General => "/news/rss.xml",
        Category::World => "/news/world/rss.xml",
        Category::Technology => "/news/technology/rss.xml",
        Category::Business => "/news/business/rss.xml",
        Category::Science => "/news/science_and_environment/rss.xml",
        Category::Sport => "/sport/rss.xml",
        Category::Culture => "/news/entertainment_and_arts/rss.xml",
        Category::Wellness => "/news/health/rss.xml",
    }
}
