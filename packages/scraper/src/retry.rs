//! HTTP retry helper for transient errors.
//!
//! [`send_text`] wraps `reqwest::RequestBuilder::send()` with exponential
//! backoff for connection failures, timeouts, HTTP 429 and HTTP 5xx. Client
//! errors (4xx other than 429) are permanent and returned immediately.
//!
//! ```ignore
//! let html = retry::send_text(|| client.get(&url), 3).await?;
//! ```

use std::time::Duration;

use crate::ScrapeError;

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// # Errors
///
/// Returns [`ScrapeError`] if the request still fails after `max_retries`
/// retries, the server returns a non-retryable status, or the body cannot
/// be read.
pub async fn send_text<F>(build_request: F, max_retries: u32) -> Result<String, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();

    response.text().await.map_err(|e| {
        log::warn!("Body read failed for {url}: {e}");
        classify(&url, e)
    })
}

/// Core retry loop. Returns the first response with a 2xx/3xx status.
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    let mut last_error: Option<ScrapeError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                let url = e.url().map(ToString::to_string).unwrap_or_default();
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(classify(&url, e));
                    continue;
                }
                return Err(classify(&url, e));
            }
            Ok(response) => {
                let status = response.status();
                let url = response.url().to_string();

                if is_retryable_status(status) {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} for {url}");
                        last_error = Some(ScrapeError::Status {
                            url,
                            status: status.as_u16(),
                        });
                        continue;
                    }
                    return Err(ScrapeError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }

                if status.is_client_error() {
                    return Err(ScrapeError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ScrapeError::Config("request failed after all retries".to_string())))
}

/// Delay before retry number `attempt` (1-based): 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.saturating_sub(1).min(6))
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn classify(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http(e)
    }
}
