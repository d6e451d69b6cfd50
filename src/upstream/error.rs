use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// connection refused, timeout, or retries exhausted without a response
    #[error("transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("malformed upstream payload: {0}")]
    Parse(String),

    #[error("could not resolve {kind} ID from input")]
    IdResolution { kind: &'static str },

    #[error("no lyrics available for song {0}")]
    NoLyrics(String),
}

impl UpstreamError {
    /// errors a fetcher reports as a soft miss instead of propagating
    pub fn is_swallowable(&self) -> bool {
        matches!(
            self,
            UpstreamError::Transport { .. } | UpstreamError::Status { .. } | UpstreamError::Parse(_)
        )
    }
}
