use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single page request
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("HTTP {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("invalid response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid base URL: {0}")]
  Url(#[from] url::ParseError),
}
