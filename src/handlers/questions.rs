//! Question catalog routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::{self, SqliteStore};
use crate::domain::Question;
use crate::error::ApiError;
use crate::extract::LearnerId;
use crate::srs::CardStore;
use crate::state::AppState;

use super::review::CardSummary;

#[derive(Debug, Serialize)]
pub struct QuestionDetail {
  #[serde(flatten)]
  pub question: Question,
  /// The learner's card, if the question has been drawn.
  pub card: Option<CardSummary>,
}

pub async fn question_detail(
  State(state): State<AppState>,
  learner: LearnerId,
  Path(id): Path<i64>,
) -> Result<Json<QuestionDetail>, ApiError> {
  let conn = db::try_lock(&state.pool)?;
  let question = db::get_question_by_id(&conn, id)?.ok_or(ApiError::QuestionNotFound(id))?;
  let card = SqliteStore::new(&conn)
    .card_for(&learner.0, id)?
    .map(|c| CardSummary::from(&c));
  Ok(Json(QuestionDetail { question, card }))
}

#[derive(Debug, Deserialize)]
pub struct NewQuestion {
  pub title: String,
  pub slug: String,
  pub difficulty: String,
  pub statement: String,
  #[serde(default)]
  pub topics: Vec<String>,
}

/// Ingest a question. Re-posting an existing slug updates it in place.
pub async fn create_question(
  State(state): State<AppState>,
  Json(request): Json<NewQuestion>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
  if request.title.trim().is_empty() || request.slug.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "title and slug must not be empty".to_string(),
    ));
  }
  if request.statement.trim().is_empty() {
    return Err(ApiError::BadRequest("statement must not be empty".to_string()));
  }

  let question = Question {
    id: 0,
    title: request.title,
    slug: request.slug,
    difficulty: request.difficulty,
    statement: request.statement,
    topics: request.topics,
    created_at: Utc::now(),
  };

  let conn = db::try_lock(&state.pool)?;
  let id = db::insert_question(&conn, &question)?;
  tracing::info!(slug = %question.slug, "Question ingested");
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
