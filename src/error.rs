//! Error taxonomy shared by the core (builder, splicer, validation) and the HTTP layer.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Generated question does not have exactly one correct answer.
  #[error("Exactly one answer must be correct, but {correct} were marked correct")]
  Validation { correct: usize },

  /// Input bytes are not a readable zip archive.
  #[error("Archive extraction error: {0}")]
  Extraction(#[from] zip::result::ZipError),

  #[error("JSON serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Scratch storage could not be created, written or removed.
  #[error("Scratch storage error: {0}")]
  Resource(#[from] std::io::Error),

  #[error("Bad request: {0}")]
  BadRequest(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Model error: {0}")]
  Upstream(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      Error::Extraction(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
      Error::Upstream(_) => StatusCode::BAD_GATEWAY,
      Error::Serialization(_) | Error::Resource(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let body = Json(json!({ "error": self.to_string() }));
    (status, body).into_response()
  }
}
