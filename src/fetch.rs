//! Bounded retry around a single outbound GET.
//!
//! This helper only governs transient failure: HTTP 429 (honoring
//! `retry-after` when the server sends one) and network-level errors. Every
//! other status, including 4xx/5xx, is returned as-is for the caller to
//! interpret. The only suspension points are the backoff sleeps.
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const MAX_RETRIES: u32 = 3;

const BASE_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Server kept answering 429 for the whole retry budget.
    #[error("rate limited after {0} attempts")]
    RateLimited(u32),
    /// Network-level failure (DNS, connection, TLS) persisted past the
    /// retry budget.
    #[error("max retries exceeded after {attempts} attempts: {source}")]
    MaxRetries {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Issue a GET, retrying the same request up to `max_retries` times total.
///
/// On 429 the delay is the server's `retry-after` (seconds) when present,
/// otherwise `min(1000 * 2^attempt, 10000)` ms. On a network error the delay
/// is `1000 * 2^attempt` ms.
pub async fn get_with_retry(
    client: &Client,
    url: Url,
    headers: HeaderMap,
    max_retries: u32,
) -> Result<Response, FetchError> {
    let max_retries = max_retries.max(1);
    let mut attempt = 0u32;

    loop {
        let result = client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                attempt += 1;
                if attempt >= max_retries {
                    return Err(FetchError::RateLimited(attempt));
                }
                let delay = retry_after(&response).unwrap_or_else(|| capped_backoff(attempt - 1));
                tracing::warn!(
                    url = %url,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Ok(response) => return Ok(response),
            Err(source) => {
                attempt += 1;
                if attempt >= max_retries {
                    return Err(FetchError::MaxRetries {
                        attempts: attempt,
                        source,
                    });
                }
                let delay = Duration::from_millis(BASE_BACKOFF_MS << (attempt - 1));
                tracing::warn!(
                    url = %url,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn capped_backoff(attempt_index: u32) -> Duration {
    let ms = (BASE_BACKOFF_MS << attempt_index).min(MAX_BACKOFF_MS);
    Duration::from_millis(ms)
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
