//! Next-card selection policy.
//!
//! Priority order, first match wins:
//!   1. New cards, FIFO by creation time. New-first bounds how many distinct
//!      problems are in flight and front-loads short-term exposure.
//!   2. Due Learning/Relearning cards, earliest due first.
//!   3. Due Review cards, earliest due first.
//!   4. Otherwise report when the next card comes due, or that the learner
//!      is done for today.
//!
//! The queue is replenished before step 1 so the New pool reflects the
//! daily limit rather than a stale queue. Replenish failures degrade the
//! selection (no New cards offered), they never abort it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::LogOnError;
use crate::domain::{CardRecord, CardState};

use super::queue;
use super::scheduler::Scheduler;
use super::store::{CardStore, StoreResult};

/// Which priority bucket the selected card came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
  New,
  Learning,
  Review,
}

/// Outcome of one selection pass.
#[derive(Debug, Clone, PartialEq)]
pub enum NextCard {
  Card { card: CardRecord, kind: CardKind },
  Wait { next_due_at: DateTime<Utc> },
  DoneForToday,
}

/// Selection result plus the side signals the caller may act on.
#[derive(Debug)]
pub struct Selection {
  pub next: NextCard,
  /// The unseen-question pool is low; the caller should poke the catalog
  /// collaborator without awaiting it.
  pub catalog_low: bool,
}

pub fn select_next<S: CardStore>(
  store: &S,
  scheduler: &Scheduler,
  learner_id: &str,
  now: DateTime<Utc>,
) -> StoreResult<Selection> {
  let catalog_low = queue::ensure_queue(store, scheduler, learner_id, now)
    .log_warn("Queue replenish failed")
    .map(|outcome| outcome.pool_low)
    .unwrap_or(false);

  if let Some(card) = store.earliest_new(learner_id)? {
    return Ok(Selection {
      next: NextCard::Card {
        card,
        kind: CardKind::New,
      },
      catalog_low,
    });
  }

  let learning_states = [CardState::Learning, CardState::Relearning];
  if let Some(card) = store.earliest_due(learner_id, &learning_states, now)? {
    return Ok(Selection {
      next: NextCard::Card {
        card,
        kind: CardKind::Learning,
      },
      catalog_low,
    });
  }

  if let Some(card) = store.earliest_due(learner_id, &[CardState::Review], now)? {
    return Ok(Selection {
      next: NextCard::Card {
        card,
        kind: CardKind::Review,
      },
      catalog_low,
    });
  }

  let next = match store.earliest_future_due(learner_id, now)? {
    Some(next_due_at) => NextCard::Wait { next_due_at },
    None => NextCard::DoneForToday,
  };
  Ok(Selection { next, catalog_low })
}
