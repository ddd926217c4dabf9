//! Thin CLI caller around the aggregation pipeline: parse filter flags,
//! invoke the aggregator, print the JSON page. The HTTP route layer in front
//! of this crate does exactly the same dance with query-string parameters.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use newsdesk::aggregator::Aggregator;
use newsdesk::category::Category;
use newsdesk::config::Config;
use newsdesk::model::{NewsFilter, DEFAULT_PAGE_SIZE};
use newsdesk::providers::{build_registry, ProviderId};

#[derive(Debug, Parser)]
#[command(name = "newsdesk", version, about = "Fetch aggregated news as JSON")]
struct Cli {
    /// Free-text search term
    #[arg(short, long)]
    query: Option<String>,

    /// Canonical category (general, business, culture, wellness, science,
    /// sport, technology, world)
    #[arg(short, long)]
    category: Option<Category>,

    /// Exact-day filter, YYYY-MM-DD
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Provider id (newsapi, guardian, bbc) or "all"
    #[arg(short, long, default_value = "all")]
    source: String,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Path to a TOML config file (missing file means defaults)
    #[arg(long, default_value = "newsdesk.toml")]
    config: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsdesk=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match cli.source.as_str() {
        "all" => None,
        other => Some(
            other
                .parse::<ProviderId>()
                .with_context(|| format!("unknown source '{other}' (expected newsapi, guardian, bbc, or all)"))?,
        ),
    };

    let filter = NewsFilter {
        query: cli.query,
        category: cli.category,
        date: cli.date,
        source,
        page: cli.page.max(1),
        page_size: cli.page_size.max(1),
    };

    let mut config = Config::load(&cli.config).context("loading configuration")?;
    config.apply_env();

    let client = reqwest::Client::new();
    let registry = build_registry(&config, client).context("building provider registry")?;
    let aggregator = Aggregator::new(registry);

    // Upstream error details stay in the logs; stdout only ever carries the
    // well-formed page or a generic failure.
    let page = aggregator
        .get_news(&filter)
        .await
        .context("failed to fetch news")?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&page)?
    } else {
        serde_json::to_string(&page)?
    };
    println!("{json}");
    Ok(())
}
