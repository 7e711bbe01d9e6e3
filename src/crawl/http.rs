//! Fetch collaborator: polite HTTP client with a fixed retry budget.
//!
//! Retry and backoff live here, below the extraction boundary. The crawl
//! runner only ever sees a page body or a terminal `FetchError`.

use std::time::{Duration, SystemTime};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

/// Default user agent.
pub const USER_AGENT: &str = concat!("missilery/", env!("CARGO_PKG_VERSION"));

/// Terminal fetch failures visible to the crawl runner.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("retry budget exhausted for {url} after {attempts} attempts")]
    BudgetExhausted { url: String, attempts: u32 },
}

/// HTTP client with inter-request spacing, jitter, and bounded retries.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
    retry_budget: u32,
}

impl HttpClient {
    /// Build a client from crawl settings.
    pub fn new(settings: &Settings) -> Self {
        let user_agent = settings.user_agent.as_deref().unwrap_or(USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            request_delay: Duration::from_millis(settings.request_delay_ms),
            retry_budget: settings.retry_budget,
        }
    }

    /// Fetch a page body as text.
    ///
    /// Transient failures (timeouts, connect errors, 429/5xx) are retried
    /// with backoff until the budget runs out; anything else surfaces
    /// immediately.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            // Polite spacing before every request, with jitter so repeated
            // runs do not fall into lockstep.
            tokio::time::sleep(with_jitter(self.request_delay)).await;

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.text().await?);
                    }
                    if !is_transient_status(status) {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    debug!("Transient status {} for {}", status, url);
                }
                Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                    debug!("Transient transport failure for {}: {}", url, e);
                }
                Err(e) => return Err(e.into()),
            }

            if attempts > self.retry_budget {
                warn!("Dropping {} after {} attempts", url, attempts);
                return Err(FetchError::BudgetExhausted {
                    url: url.to_string(),
                    attempts,
                });
            }
            // Linear backoff on top of the base delay.
            tokio::time::sleep(self.request_delay * attempts).await;
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Add up to 50% jitter derived from the clock.
fn with_jitter(base: Duration) -> Duration {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    base + base.mul_f64((nanos % 1024) as f64 / 2048.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_half_of_base() {
        let base = Duration::from_millis(1000);
        for _ in 0..32 {
            let jittered = with_jitter(base);
            assert!(jittered >= base);
            assert!(jittered <= base + base / 2);
        }
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_status(StatusCode::NOT_FOUND));
    }
}
