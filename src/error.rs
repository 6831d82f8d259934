//! API error type shared by all handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbLockError;
use crate::grading::GradeError;
use crate::srs::{SessionError, StoreError};

#[derive(Debug)]
pub enum ApiError {
  BadRequest(String),
  NoActiveCard,
  QuestionNotFound(i64),
  Grading(GradeError),
  Store(StoreError),
  DbLock,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
      Self::NoActiveCard => (
        StatusCode::BAD_REQUEST,
        "no active card for this question".to_string(),
      ),
      Self::QuestionNotFound(id) => (StatusCode::NOT_FOUND, format!("question {} not found", id)),
      Self::Grading(e) => {
        tracing::error!("Grading failed: {}", e);
        (StatusCode::BAD_GATEWAY, "grading service failed".to_string())
      }
      Self::Store(e) => {
        tracing::error!("Store error: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
      }
      Self::DbLock => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "database unavailable".to_string(),
      ),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    Self::Store(e)
  }
}

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self {
    match e {
      SessionError::NoActiveCard => Self::NoActiveCard,
      SessionError::Store(e) => Self::Store(e),
    }
  }
}

impl From<GradeError> for ApiError {
  fn from(e: GradeError) -> Self {
    Self::Grading(e)
  }
}

impl From<DbLockError> for ApiError {
  fn from(_: DbLockError) -> Self {
    Self::DbLock
  }
}

impl From<rusqlite::Error> for ApiError {
  fn from(e: rusqlite::Error) -> Self {
    Self::Store(StoreError::new(e.to_string()))
  }
}
