use anyhow::{bail, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Backoff applied when a listing endpoint answers 429.
///
/// `max_attempts: None` keeps the historical retry-forever behavior; a
/// finite cap turns exhaustion into an error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn from_options(options: &catalog_sync_config::RetryOptions) -> Self {
        Self {
            delay: Duration::from_secs(options.delay_secs),
            max_attempts: options.max_attempts,
        }
    }
}

/// One page of a REST listing plus the page count the API reported for it.
pub struct RestPage<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

/// Fetch every page of a REST listing, starting at page 1 and stopping once
/// the fetched page number reaches the reported page count. Page and row
/// order is preserved.
pub async fn collect_rest_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<RestPage<T>>>,
{
    let mut all = Vec::new();
    let mut page = 1u32;
    loop {
        let fetched = fetch(page).await?;
        let total_pages = fetched.total_pages;
        all.extend(fetched.items);
        if page >= total_pages {
            break;
        }
        page += 1;
    }
    Ok(all)
}

/// Fetch pages of an HTML listing until a page parses to zero rows. The
/// listing endpoint serves empty pages past the end instead of 404ing.
pub async fn collect_html_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut all = Vec::new();
    let mut page = 1u32;
    loop {
        let rows = fetch(page).await?;
        if rows.is_empty() {
            break;
        }
        all.extend(rows);
        page += 1;
    }
    Ok(all)
}

/// Run `fetch` until it yields something `rate_limited` rejects: each
/// rate-limited result pauses per the policy and refetches the same thing.
/// Every other result, success or not, goes back to the caller as-is.
pub async fn fetch_with_backoff<R, F, Fut, P>(
    mut fetch: F,
    rate_limited: P,
    policy: &RetryPolicy,
    what: &str,
) -> Result<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
    P: Fn(&R) -> bool,
{
    let mut attempts = 0u32;
    loop {
        let result = fetch().await?;
        if !rate_limited(&result) {
            return Ok(result);
        }

        attempts += 1;
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                bail!("Still rate limited on {} after {} attempts", what, attempts);
            }
        }
        warn!(what, attempts, delay = ?policy.delay, "Rate limited, pausing before retry");
        tokio::time::sleep(policy.delay).await;
        info!("Continuing after rate-limit pause");
    }
}

/// GET with the rate-limit policy applied: a 429 pauses and refetches the
/// same URL.
pub async fn get_with_backoff(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<reqwest::Response> {
    fetch_with_backoff(
        || async { Ok(client.get(url).send().await?) },
        |response| response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS,
        policy,
        url,
    )
    .await
}
