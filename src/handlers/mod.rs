pub mod history;
pub mod questions;
pub mod review;
pub mod settings;
pub mod stats;

pub use history::*;
pub use questions::*;
pub use review::*;
pub use settings::*;
pub use stats::*;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub async fn health() -> &'static str {
  "OK"
}

/// Full route table; shared between `main` and the handler tests.
pub fn app(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/review/next", get(review::next_card))
    .route("/review/submit", post(review::submit_answer))
    .route("/review/skip", post(review::skip_card))
    .route("/cards/{question_id}/suspend", post(review::suspend_card))
    .route("/cards/{question_id}/unsuspend", post(review::unsuspend_card))
    .route("/questions", post(questions::create_question))
    .route("/questions/{id}", get(questions::question_detail))
    .route("/history", get(history::history))
    .route("/stats/today", get(stats::today_stats))
    .route(
      "/settings",
      get(settings::get_settings).post(settings::update_settings),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
  use rusqlite::Connection;
  use std::sync::{Arc, Mutex};

  use crate::config::{GraderConfig, SrsConfig};
  use crate::grading::LlmGrader;
  use crate::srs::Scheduler;
  use crate::state::AppState;

  /// In-memory application state with grading pointed at a dead endpoint.
  pub fn test_state() -> AppState {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::run_migrations(&conn).unwrap();
    AppState::new(
      Arc::new(Mutex::new(conn)),
      Scheduler::new(SrsConfig::default()),
      LlmGrader::new(GraderConfig::default()).unwrap(),
      None,
    )
  }

  pub fn seed_questions(state: &AppState, n: i64) {
    let conn = state.pool.lock().unwrap();
    for i in 1..=n {
      conn
        .execute(
          r#"
      INSERT INTO questions (id, title, slug, difficulty, statement, topics, created_at)
      VALUES (?1, ?2, ?3, 'Easy', 'statement', '["array"]', '2025-01-01T00:00:00+00:00')
      "#,
          rusqlite::params![i, format!("Question {}", i), format!("question-{}", i)],
        )
        .unwrap();
    }
  }
}
