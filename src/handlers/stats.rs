//! Progress and workload statistics.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::{self, DueCounts};
use crate::error::ApiError;
use crate::extract::LearnerId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TodayStats {
  #[serde(flatten)]
  pub counts: DueCounts,
  pub attempts_today: i64,
  pub mature_cards: i64,
}

pub async fn today_stats(
  State(state): State<AppState>,
  learner: LearnerId,
) -> Result<Json<TodayStats>, ApiError> {
  let now = Utc::now();
  let conn = db::try_lock(&state.pool)?;
  let counts = db::get_due_counts(&conn, &learner.0, now)?;
  let attempts_today = db::count_attempts_today(&conn, &learner.0, now)?;
  let mature_cards = db::count_mature_cards(&conn, &learner.0)?;
  Ok(Json(TodayStats {
    counts,
    attempts_today,
    mature_cards,
  }))
}

#[cfg(test)]
mod tests {
  use super::super::{app, test_support};
  use axum_test::TestServer;
  use serde_json::Value;

  #[tokio::test]
  async fn test_empty_stats() {
    let server = TestServer::new(app(test_support::test_state())).unwrap();
    let body: Value = server
      .get("/stats/today")
      .add_header("x-learner-id", "learner-1")
      .await
      .json();
    assert_eq!(body["learning_due"], 0);
    assert_eq!(body["attempts_today"], 0);
    assert_eq!(body["mature_cards"], 0);
  }

  #[tokio::test]
  async fn test_drawn_cards_show_up_as_new() {
    let state = test_support::test_state();
    test_support::seed_questions(&state, 3);
    let server = TestServer::new(app(state)).unwrap();

    // Drawing the next card replenishes the queue up to the daily limit.
    server
      .get("/review/next")
      .add_header("x-learner-id", "learner-1")
      .await;

    let body: Value = server
      .get("/stats/today")
      .add_header("x-learner-id", "learner-1")
      .await
      .json();
    assert_eq!(body["new_available"], 3);
  }
}
