use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical scheduling unit is minutes; days are derived for display.
pub const MINUTES_PER_DAY: i64 = 1440;

/// Interval (in days) beyond which a graduated card counts as mature.
pub const MATURE_INTERVAL_DAYS: i64 = 21;

/// Starting easiness factor for a freshly drawn card.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Scheduling state of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
  New,
  Learning,
  Review,
  Relearning,
  Suspended,
}

impl CardState {
  pub fn from_str(s: &str) -> Self {
    match s {
      "learning" => Self::Learning,
      "review" => Self::Review,
      "relearning" => Self::Relearning,
      "suspended" => Self::Suspended,
      _ => Self::New,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Review => "review",
      Self::Relearning => "relearning",
      Self::Suspended => "suspended",
    }
  }

  /// States that schedule through the learning steps rather than the
  /// graduated-interval formula.
  pub fn is_learning_phase(&self) -> bool {
    matches!(self, Self::New | Self::Learning | Self::Relearning)
  }
}

/// Derive the display interval in days from the canonical minute interval.
/// A positive interval never displays as "0 days".
pub fn interval_days_from_minutes(interval_minutes: i64) -> i64 {
  let days = interval_minutes / MINUTES_PER_DAY;
  if days == 0 && interval_minutes > 0 {
    1
  } else {
    days
  }
}

/// The persisted scheduling record for one (learner, question) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
  pub id: i64,
  pub learner_id: String,
  pub question_id: i64,
  pub state: CardState,
  /// Last submitted score (0-5); None before the first review.
  pub quality: Option<i64>,
  pub easiness_factor: f64,
  pub interval_days: i64,
  pub interval_minutes: i64,
  /// Index into the configured learning steps; meaningful only while
  /// the card is in the learning phase.
  pub current_step: usize,
  /// Consecutive passing reviews since the last lapse.
  pub repetitions: i64,
  pub next_review_at: DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,
  pub total_reviews: i64,
  pub total_lapses: i64,
  pub created_at: DateTime<Utc>,
}

impl CardRecord {
  /// A freshly drawn question: immediately eligible, nothing reviewed yet.
  pub fn new(learner_id: String, question_id: i64, now: DateTime<Utc>) -> Self {
    Self {
      id: 0,
      learner_id,
      question_id,
      state: CardState::New,
      quality: None,
      easiness_factor: INITIAL_EASE_FACTOR,
      interval_days: 0,
      interval_minutes: 0,
      current_step: 0,
      repetitions: 0,
      next_review_at: now,
      last_reviewed_at: None,
      total_reviews: 0,
      total_lapses: 0,
      created_at: now,
    }
  }

  /// Set the canonical interval and keep the derived day count in sync.
  pub fn set_interval_minutes(&mut self, minutes: i64) {
    self.interval_minutes = minutes;
    self.interval_days = interval_days_from_minutes(minutes);
  }

  /// Set the interval in whole days (graduated cards).
  pub fn set_interval_days(&mut self, days: i64) {
    self.interval_days = days;
    self.interval_minutes = days * MINUTES_PER_DAY;
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.state != CardState::Suspended && self.next_review_at <= now
  }

  /// Maturity is derived, never stored: a graduated card with a long interval.
  pub fn is_mature(&self) -> bool {
    self.state == CardState::Review && self.interval_days > MATURE_INTERVAL_DAYS
  }

  /// Remove the card from scheduling; every other field is left untouched.
  pub fn suspend(&mut self) {
    self.state = CardState::Suspended;
  }

  /// Restore a suspended card to the phase its interval implies.
  ///
  /// Decided on the raw minute interval: `interval_days` is display-forced
  /// to 1 for any positive sub-day interval, so it cannot tell a graduated
  /// card apart from one mid-way through the learning steps.
  pub fn unsuspend(&mut self) {
    if self.state != CardState::Suspended {
      return;
    }
    self.state = if self.interval_minutes >= MINUTES_PER_DAY {
      CardState::Review
    } else {
      CardState::Learning
    };
  }

  /// Human-readable state, distinguishing young and mature review cards.
  pub fn state_description(&self) -> &'static str {
    match self.state {
      CardState::New => "New card",
      CardState::Learning => "Learning",
      CardState::Relearning => "Relearning",
      CardState::Suspended => "Suspended",
      CardState::Review => {
        if self.is_mature() {
          "Mature (Review)"
        } else {
          "Young (Review)"
        }
      }
    }
  }
}
