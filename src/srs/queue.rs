//! Keeps a bounded pool of New cards materialized ahead of selection.
//!
//! The daily quota bounds how many new questions are drawn per calendar day;
//! the queue-space bound prevents pre-fetching past the configured limit
//! across idle days. Draw failures are skipped, never fatal.

use chrono::{DateTime, Utc};

use crate::db::LogOnError;
use crate::domain::CardState;

use super::scheduler::Scheduler;
use super::store::{CardStore, StoreResult};

/// What a replenish pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplenishOutcome {
  /// New card records materialized by this pass.
  pub created: usize,
  /// Unseen-question pool fell below the low-water mark; the caller should
  /// signal the catalog collaborator (fire-and-forget).
  pub pool_low: bool,
}

impl ReplenishOutcome {
  fn idle() -> Self {
    Self {
      created: 0,
      pool_low: false,
    }
  }
}

/// Top up the learner's New queue, respecting the daily quota.
pub fn ensure_queue<S: CardStore>(
  store: &S,
  scheduler: &Scheduler,
  learner_id: &str,
  now: DateTime<Utc>,
) -> StoreResult<ReplenishOutcome> {
  let config = scheduler.config();
  let limit = store
    .new_cards_limit(learner_id)?
    .unwrap_or(config.default_new_cards_limit);

  // Quota counts cards drawn today in any state, not queue occupancy:
  // studying a card out of the queue must not free up another draw.
  let fetched_today = store.count_cards_created_today(learner_id, now)?;
  let remaining_daily_quota = limit - fetched_today;
  if remaining_daily_quota <= 0 {
    return Ok(ReplenishOutcome::idle());
  }

  let new_in_queue = store.count_cards_in_state(learner_id, CardState::New)?;
  let queue_space = limit - new_in_queue;
  if queue_space <= 0 {
    return Ok(ReplenishOutcome::idle());
  }

  let needed = remaining_daily_quota.min(queue_space);
  let mut created = 0usize;
  for _ in 0..needed {
    match store
      .question_unseen_by(learner_id)
      .log_warn("Unseen-question lookup failed")
    {
      Some(Some(question)) => {
        let card = scheduler.init_card(learner_id, question.id, now);
        if store
          .create_card(&card)
          .log_warn("Skipping failed card draw")
          .is_some()
        {
          created += 1;
        }
      }
      // Pool exhausted; the low-water signal below takes it from here.
      Some(None) => break,
      None => {}
    }
  }

  let pool_low = store
    .unseen_count(learner_id)
    .map(|count| count < config.catalog_low_water_mark)
    .log_warn_default("Unseen-question count failed");

  Ok(ReplenishOutcome { created, pool_low })
}
