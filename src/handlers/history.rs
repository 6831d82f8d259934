//! Attempt history route.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::{self, Attempt};
use crate::error::ApiError;
use crate::extract::LearnerId;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub limit: Option<i64>,
}

pub async fn history(
  State(state): State<AppState>,
  learner: LearnerId,
  Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Attempt>>, ApiError> {
  let limit = query
    .limit
    .unwrap_or(DEFAULT_HISTORY_LIMIT)
    .clamp(1, MAX_HISTORY_LIMIT);
  let conn = db::try_lock(&state.pool)?;
  let attempts = db::get_attempts(&conn, &learner.0, limit)?;
  Ok(Json(attempts))
}

#[cfg(test)]
mod tests {
  use super::super::{app, test_support};
  use axum_test::TestServer;
  use chrono::Utc;
  use serde_json::Value;

  #[tokio::test]
  async fn test_history_is_scoped_to_the_learner() {
    let state = test_support::test_state();
    test_support::seed_questions(&state, 1);
    {
      let conn = state.pool.lock().unwrap();
      let card = crate::domain::CardRecord::new("learner-1".to_string(), 1, Utc::now());
      crate::db::insert_attempt(&conn, &card, "my answer", 4, Some("good"), Utc::now()).unwrap();
    }
    let server = TestServer::new(app(state)).unwrap();

    let mine: Vec<Value> = server
      .get("/history")
      .add_header("x-learner-id", "learner-1")
      .await
      .json();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["score"], 4);

    let theirs: Vec<Value> = server
      .get("/history")
      .add_header("x-learner-id", "learner-2")
      .await
      .json();
    assert!(theirs.is_empty());
  }
}
