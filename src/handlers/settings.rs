//! Per-learner scheduling settings.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::{self};
use crate::error::ApiError;
use crate::extract::LearnerId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
  /// The learner's override, if any.
  pub new_cards_limit: Option<i64>,
  /// Limit in effect after falling back to the service default.
  pub effective_new_cards_limit: i64,
}

pub async fn get_settings(
  State(state): State<AppState>,
  learner: LearnerId,
) -> Result<Json<SettingsResponse>, ApiError> {
  let conn = db::try_lock(&state.pool)?;
  let override_limit = db::get_new_cards_limit(&conn, &learner.0)?;
  let effective = override_limit.unwrap_or(state.scheduler.config().default_new_cards_limit);
  Ok(Json(SettingsResponse {
    new_cards_limit: override_limit,
    effective_new_cards_limit: effective,
  }))
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
  pub new_cards_limit: i64,
}

pub async fn update_settings(
  State(state): State<AppState>,
  learner: LearnerId,
  Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, ApiError> {
  if update.new_cards_limit <= 0 {
    return Err(ApiError::BadRequest(
      "new_cards_limit must be positive".to_string(),
    ));
  }
  let conn = db::try_lock(&state.pool)?;
  db::set_new_cards_limit(&conn, &learner.0, update.new_cards_limit)?;
  Ok(Json(SettingsResponse {
    new_cards_limit: Some(update.new_cards_limit),
    effective_new_cards_limit: update.new_cards_limit,
  }))
}

#[cfg(test)]
mod tests {
  use super::super::{app, test_support};
  use axum_test::TestServer;
  use serde_json::{json, Value};

  #[tokio::test]
  async fn test_default_limit_until_overridden() {
    let server = TestServer::new(app(test_support::test_state())).unwrap();

    let body: Value = server
      .get("/settings")
      .add_header("x-learner-id", "learner-1")
      .await
      .json();
    assert!(body["new_cards_limit"].is_null());
    assert_eq!(body["effective_new_cards_limit"], 5);

    let updated: Value = server
      .post("/settings")
      .add_header("x-learner-id", "learner-1")
      .json(&json!({ "new_cards_limit": 12 }))
      .await
      .json();
    assert_eq!(updated["new_cards_limit"], 12);

    let body: Value = server
      .get("/settings")
      .add_header("x-learner-id", "learner-1")
      .await
      .json();
    assert_eq!(body["effective_new_cards_limit"], 12);
  }

  #[tokio::test]
  async fn test_zero_limit_is_rejected() {
    let server = TestServer::new(app(test_support::test_state())).unwrap();
    let response = server
      .post("/settings")
      .add_header("x-learner-id", "learner-1")
      .json(&json!({ "new_cards_limit": 0 }))
      .await;
    assert_eq!(response.status_code(), 400);
  }
}
