//! Pooled, retrying GET client used for every upstream call.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::{config::UpstreamConfig, upstream::error::UpstreamError};

const RETRY_STATUSES: &[u16] = &[500, 502, 503, 504];
const MAX_BACKOFF: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One GET round trip. `Err` carries a connection-level failure description.
pub trait Transport: Send + Sync {
    fn get_text(&self, url: &str, timeout: Duration) -> Result<RawResponse, String>;
}

impl Transport for ureq::Agent {
    fn get_text(&self, url: &str, timeout: Duration) -> Result<RawResponse, String> {
        let response = match ureq::Agent::get(self, url).timeout(timeout).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(transport.to_string()),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|e| format!("failed to read body: {e}"))?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    max_retries: u32,
    backoff_base: Duration,
    deadline: Duration,
}

impl HttpClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.read_timeout())
            .max_idle_connections(config.max_connections_per_host)
            .max_idle_connections_per_host(config.max_connections_per_host)
            .user_agent(&config.user_agent)
            .build();
        Self::with_transport(Arc::new(agent), config)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &UpstreamConfig) -> Self {
        Self {
            transport,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
            deadline: config.request_deadline(),
        }
    }

    fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(6);
        self.backoff_base
            .checked_mul(1u32 << exponent)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.deadline
    }

    /// GETs `url` and returns the body of a 2xx response.
    ///
    /// Connection failures and 500/502/503/504 are retried with exponential
    /// backoff; any other status fails immediately. Every attempt is bounded
    /// by what is left until `deadline`, which callers share across all the
    /// fetches made for one inbound request.
    pub fn fetch_until(&self, url: &str, deadline: Instant) -> Result<String, UpstreamError> {
        let mut retry = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(UpstreamError::Transport {
                    url: url.to_string(),
                    reason: "request deadline exceeded".to_string(),
                });
            }

            let failure = match self.transport.get_text(url, remaining) {
                Ok(response) if (200..300).contains(&response.status) => {
                    return Ok(response.body);
                }
                Ok(response) if RETRY_STATUSES.contains(&response.status) => {
                    UpstreamError::Status {
                        url: url.to_string(),
                        status: response.status,
                    }
                }
                Ok(response) => {
                    return Err(UpstreamError::Status {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Err(reason) => UpstreamError::Transport {
                    url: url.to_string(),
                    reason,
                },
            };

            if retry >= self.max_retries {
                log::warn!("giving up on {url} after {} attempts: {failure}", retry + 1);
                return Err(failure);
            }
            retry += 1;
            let backoff = self.backoff_delay(retry);
            if Instant::now() + backoff >= deadline {
                log::warn!("no time left to retry {url}: {failure}");
                return Err(failure);
            }
            log::debug!("retry {retry} for {url} in {backoff:?}: {failure}");
            thread::sleep(backoff);
        }
    }
}
