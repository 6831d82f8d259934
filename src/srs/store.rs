//! Persistence contract for the scheduling engine.
//!
//! The engine never sees SQL; everything it needs from storage is expressed
//! here. `crate::db::SqliteStore` is the production implementation.

use chrono::{DateTime, Utc};

use crate::domain::{CardRecord, CardState, Question};

/// Failure in the persistence collaborator.
#[derive(Debug)]
pub struct StoreError {
  message: String,
}

impl StoreError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

impl std::fmt::Display for StoreError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "store error: {}", self.message)
  }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Card and question storage as seen by the scheduler.
///
/// Due queries must exclude suspended cards. Ordered queries break ties on
/// record id so repeated selection with no intervening writes is idempotent.
pub trait CardStore {
  /// A question this learner has no card record for yet, if any remain.
  fn question_unseen_by(&self, learner_id: &str) -> StoreResult<Option<Question>>;

  /// How many questions the learner has never drawn.
  fn unseen_count(&self, learner_id: &str) -> StoreResult<i64>;

  fn card_for(&self, learner_id: &str, question_id: i64) -> StoreResult<Option<CardRecord>>;

  /// Persist a freshly initialized record and return it with its id assigned.
  fn create_card(&self, card: &CardRecord) -> StoreResult<CardRecord>;

  fn update_card(&self, card: &CardRecord) -> StoreResult<()>;

  /// Cards materialized on the calendar day of `now` (UTC), any state.
  fn count_cards_created_today(&self, learner_id: &str, now: DateTime<Utc>) -> StoreResult<i64>;

  fn count_cards_in_state(&self, learner_id: &str, state: CardState) -> StoreResult<i64>;

  /// Oldest not-yet-studied card, FIFO by creation time.
  fn earliest_new(&self, learner_id: &str) -> StoreResult<Option<CardRecord>>;

  /// Earliest-due card among `states` with `next_review_at <= before`.
  fn earliest_due(
    &self,
    learner_id: &str,
    states: &[CardState],
    before: DateTime<Utc>,
  ) -> StoreResult<Option<CardRecord>>;

  /// Smallest `next_review_at` strictly after `after` across all
  /// non-suspended cards.
  fn earliest_future_due(
    &self,
    learner_id: &str,
    after: DateTime<Utc>,
  ) -> StoreResult<Option<DateTime<Utc>>>;

  /// Per-learner daily new-card limit, if the learner has set one.
  fn new_cards_limit(&self, learner_id: &str) -> StoreResult<Option<i64>>;
}
