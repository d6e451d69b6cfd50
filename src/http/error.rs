use rouille::Response;
use serde::Serialize;
use thiserror::Error;

use crate::upstream::error::UpstreamError;

/// Failure of a route; always rendered as a `status: false` JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingParam(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    status: bool,
    error: String,
}

impl ApiError {
    pub fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            log::error!("{msg}");
        }
        Response::json(&ErrorBody {
            status: false,
            error: self.to_string(),
        })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
