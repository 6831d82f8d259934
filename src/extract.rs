//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Learner identity, taken from the `X-Learner-Id` header.
///
/// Every scheduling route is scoped to one learner; requests without the
/// header are rejected before any handler logic runs.
#[derive(Debug, Clone)]
pub struct LearnerId(pub String);

impl<S> FromRequestParts<S> for LearnerId
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get("x-learner-id")
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .ok_or_else(|| ApiError::BadRequest("missing X-Learner-Id header".to_string()))?;
    Ok(Self(value.to_string()))
  }
}
