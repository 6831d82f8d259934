//! Orchestration core for answer submission.
//!
//! Grading happens outside this module; by the time `apply_review` runs, the
//! score is already in hand. A grading failure therefore never reaches the
//! card record, and a persistence failure discards the computed state.

use chrono::{DateTime, Utc};

use crate::domain::CardRecord;

use super::scheduler::Scheduler;
use super::store::{CardStore, StoreError};

/// Skipping a card is an immediate lapse, not a separate code path.
pub const SKIP_SCORE: i64 = 0;

#[derive(Debug)]
pub enum SessionError {
  /// No card record exists; the learner must draw the card first.
  NoActiveCard,
  Store(StoreError),
}

impl std::fmt::Display for SessionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NoActiveCard => write!(f, "no active card; draw the card first"),
      Self::Store(e) => write!(f, "{}", e),
    }
  }
}

impl std::error::Error for SessionError {}

impl From<StoreError> for SessionError {
  fn from(e: StoreError) -> Self {
    Self::Store(e)
  }
}

/// Apply a scored review to the learner's card and commit it.
pub fn apply_review<S: CardStore>(
  store: &S,
  scheduler: &Scheduler,
  learner_id: &str,
  question_id: i64,
  score: i64,
  now: DateTime<Utc>,
) -> Result<CardRecord, SessionError> {
  let card = store
    .card_for(learner_id, question_id)?
    .ok_or(SessionError::NoActiveCard)?;
  let advanced = scheduler.advance(&card, score, now);
  store.update_card(&advanced)?;
  Ok(advanced)
}

/// Skip the card: scheduling-equivalent to submitting a failing score.
pub fn apply_skip<S: CardStore>(
  store: &S,
  scheduler: &Scheduler,
  learner_id: &str,
  question_id: i64,
  now: DateTime<Utc>,
) -> Result<CardRecord, SessionError> {
  apply_review(store, scheduler, learner_id, question_id, SKIP_SCORE, now)
}
