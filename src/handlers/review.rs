//! Study-session routes: draw the next card, submit, skip, suspend.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{self, DueCounts, SqliteStore};
use crate::domain::{CardRecord, Question};
use crate::error::ApiError;
use crate::extract::LearnerId;
use crate::srs::{apply_review, apply_skip, select_next, CardKind, CardStore, NextCard};
use crate::state::AppState;

/// Card fields the client needs to render scheduling state.
#[derive(Debug, Serialize)]
pub struct CardSummary {
  pub question_id: i64,
  pub state: &'static str,
  pub state_description: &'static str,
  pub easiness_factor: f64,
  pub interval_minutes: i64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub total_lapses: i64,
  pub next_review_at: DateTime<Utc>,
}

impl From<&CardRecord> for CardSummary {
  fn from(card: &CardRecord) -> Self {
    Self {
      question_id: card.question_id,
      state: card.state.as_str(),
      state_description: card.state_description(),
      easiness_factor: card.easiness_factor,
      interval_minutes: card.interval_minutes,
      interval_days: card.interval_days,
      repetitions: card.repetitions,
      total_lapses: card.total_lapses,
      next_review_at: card.next_review_at,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct NextCardResponse {
  pub status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<CardKind>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub card: Option<CardSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub question: Option<Question>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_due_at: Option<DateTime<Utc>>,
  pub counts: DueCounts,
}

pub async fn next_card(
  State(state): State<AppState>,
  learner: LearnerId,
) -> Result<Json<NextCardResponse>, ApiError> {
  let now = Utc::now();

  let (selection, question, counts) = {
    let conn = db::try_lock(&state.pool)?;
    let store = SqliteStore::new(&conn);
    let selection = select_next(&store, &state.scheduler, &learner.0, now)?;
    let question = match &selection.next {
      NextCard::Card { card, .. } => {
        let q = db::get_question_by_id(&conn, card.question_id)?
          .ok_or(ApiError::QuestionNotFound(card.question_id))?;
        Some(q)
      }
      _ => None,
    };
    let counts = db::get_due_counts(&conn, &learner.0, now)?;
    (selection, question, counts)
  };

  if selection.catalog_low {
    if let Some(catalog) = state.catalog.clone() {
      tokio::spawn(async move { catalog.request_refill().await });
    }
  }

  let response = match selection.next {
    NextCard::Card { card, kind } => NextCardResponse {
      status: "card",
      kind: Some(kind),
      card: Some(CardSummary::from(&card)),
      question,
      next_due_at: None,
      counts,
    },
    NextCard::Wait { next_due_at } => NextCardResponse {
      status: "wait",
      kind: None,
      card: None,
      question: None,
      next_due_at: Some(next_due_at),
      counts,
    },
    NextCard::DoneForToday => NextCardResponse {
      status: "done",
      kind: None,
      card: None,
      question: None,
      next_due_at: None,
      counts,
    },
  };
  Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
  pub question_id: i64,
  pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub score: i64,
  pub feedback: String,
  pub card: CardSummary,
}

pub async fn submit_answer(
  State(state): State<AppState>,
  learner: LearnerId,
  Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
  if request.answer.trim().is_empty() {
    return Err(ApiError::BadRequest("answer must not be empty".to_string()));
  }
  let now = Utc::now();

  // Confirm the card exists and fetch the question before paying for
  // grading. The lock is released while the grading call is in flight.
  let question = {
    let conn = db::try_lock(&state.pool)?;
    let store = SqliteStore::new(&conn);
    store
      .card_for(&learner.0, request.question_id)?
      .ok_or(ApiError::NoActiveCard)?;
    db::get_question_by_id(&conn, request.question_id)?
      .ok_or(ApiError::QuestionNotFound(request.question_id))?
  };

  let graded = state.grader.grade(&question, &request.answer).await?;

  let conn = db::try_lock(&state.pool)?;
  let store = SqliteStore::new(&conn);
  let card = apply_review(
    &store,
    &state.scheduler,
    &learner.0,
    request.question_id,
    graded.score,
    now,
  )?;
  db::insert_attempt(
    &conn,
    &card,
    &request.answer,
    graded.score,
    Some(&graded.feedback),
    now,
  )?;

  tracing::info!(
    learner = %learner.0,
    question_id = request.question_id,
    score = graded.score,
    state = card.state.as_str(),
    "Review submitted"
  );

  Ok(Json(SubmitResponse {
    score: graded.score,
    feedback: graded.feedback,
    card: CardSummary::from(&card),
  }))
}

#[derive(Debug, Deserialize)]
pub struct SkipRequest {
  pub question_id: i64,
}

/// Skip without answering. No grading call, no attempt row.
pub async fn skip_card(
  State(state): State<AppState>,
  learner: LearnerId,
  Json(request): Json<SkipRequest>,
) -> Result<Json<CardSummary>, ApiError> {
  let now = Utc::now();
  let conn = db::try_lock(&state.pool)?;
  let store = SqliteStore::new(&conn);
  let card = apply_skip(&store, &state.scheduler, &learner.0, request.question_id, now)?;
  Ok(Json(CardSummary::from(&card)))
}

pub async fn suspend_card(
  State(state): State<AppState>,
  learner: LearnerId,
  Path(question_id): Path<i64>,
) -> Result<Json<CardSummary>, ApiError> {
  let conn = db::try_lock(&state.pool)?;
  let store = SqliteStore::new(&conn);
  let mut card = store
    .card_for(&learner.0, question_id)?
    .ok_or(ApiError::NoActiveCard)?;
  card.suspend();
  store.update_card(&card)?;
  Ok(Json(CardSummary::from(&card)))
}

pub async fn unsuspend_card(
  State(state): State<AppState>,
  learner: LearnerId,
  Path(question_id): Path<i64>,
) -> Result<Json<CardSummary>, ApiError> {
  let conn = db::try_lock(&state.pool)?;
  let store = SqliteStore::new(&conn);
  let mut card = store
    .card_for(&learner.0, question_id)?
    .ok_or(ApiError::NoActiveCard)?;
  card.unsuspend();
  store.update_card(&card)?;
  Ok(Json(CardSummary::from(&card)))
}
