//! SM-2 derivative interval engine with sub-day learning steps.
//!
//! Pure compute: given a card record, a score, and an explicit `now`, it
//! produces the next record. The caller commits the result; nothing is
//! persisted here.

use chrono::{DateTime, Duration, Utc};

use crate::config::SrsConfig;
use crate::domain::{CardRecord, CardState};

pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Multiplier applied to a graduated interval on a "hard" pass.
const HARD_INTERVAL_MULTIPLIER: f64 = 1.2;

/// Extra factor on top of the easiness factor for an "easy" pass.
const EASY_INTERVAL_BONUS: f64 = 1.3;

/// Review outcome, derived exactly once from the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  /// score < 3: a lapse
  Again,
  /// score == 3
  Hard,
  /// score == 4
  Good,
  /// score == 5
  Easy,
}

impl Decision {
  /// Expects a score already clamped to 0-5.
  pub fn from_score(score: i64) -> Self {
    match score {
      s if s < 3 => Self::Again,
      3 => Self::Hard,
      4 => Self::Good,
      _ => Self::Easy,
    }
  }
}

/// Scores outside 0-5 are clamped, not rejected.
pub fn clamp_score(score: i64) -> i64 {
  score.clamp(0, 5)
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
fn next_ease_factor(current: f64, score: i64) -> f64 {
  let q = score as f64;
  let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
  (current + delta).max(MIN_EASE_FACTOR)
}

/// The interval engine. Holds the injected scheduling configuration and
/// nothing else; every call is deterministic given `now`.
#[derive(Debug, Clone)]
pub struct Scheduler {
  config: SrsConfig,
}

impl Scheduler {
  /// An empty step sequence would make every learning-phase branch index
  /// out of bounds; fall back to the default steps instead.
  pub fn new(mut config: SrsConfig) -> Self {
    if config.learning_steps.is_empty() {
      tracing::warn!("Empty learning_steps; using the default step sequence");
      config.learning_steps = SrsConfig::default().learning_steps;
    }
    Self { config }
  }

  pub fn config(&self) -> &SrsConfig {
    &self.config
  }

  /// Materialize the record for a freshly drawn question.
  pub fn init_card(
    &self,
    learner_id: &str,
    question_id: i64,
    now: DateTime<Utc>,
  ) -> CardRecord {
    CardRecord::new(learner_id.to_string(), question_id, now)
  }

  /// Apply one review to a card and return the resulting record.
  ///
  /// A suspended card is frozen: scheduling leaves it untouched until it is
  /// explicitly unsuspended.
  pub fn advance(&self, card: &CardRecord, score: i64, now: DateTime<Utc>) -> CardRecord {
    if card.state == CardState::Suspended {
      return card.clone();
    }

    let score = clamp_score(score);
    let decision = Decision::from_score(score);
    let mut next = card.clone();

    if card.state.is_learning_phase() {
      self.advance_learning(&mut next, decision);
    } else {
      self.advance_review(&mut next, decision);
    }

    // The easiness recurrence applies on every review, learning phase included.
    next.easiness_factor = next_ease_factor(next.easiness_factor, score);

    next.quality = Some(score);
    next.total_reviews += 1;
    next.next_review_at = now + Duration::minutes(next.interval_minutes);
    next.last_reviewed_at = Some(now);
    next
  }

  /// New/Learning/Relearning cards walk the configured step sequence.
  fn advance_learning(&self, card: &mut CardRecord, decision: Decision) {
    let steps = &self.config.learning_steps;

    match decision {
      Decision::Again => {
        card.current_step = 0;
        card.set_interval_minutes(steps[0]);
        card.repetitions = 0;
        card.total_lapses += 1;
        if card.state == CardState::New {
          card.state = CardState::Learning;
        }
      }
      Decision::Hard => {
        card.current_step = card.current_step.saturating_sub(1);
        card.set_interval_minutes(steps[card.current_step]);
        card.repetitions += 1;
        if card.state == CardState::New {
          card.state = CardState::Learning;
        }
      }
      Decision::Good => {
        card.current_step += 1;
        card.repetitions += 1;
        if card.current_step >= steps.len() {
          self.graduate(card, self.config.graduation_interval_minutes);
        } else {
          card.set_interval_minutes(steps[card.current_step]);
          if card.state == CardState::New {
            card.state = CardState::Learning;
          }
        }
      }
      Decision::Easy => {
        card.repetitions += 1;
        // Close enough to the end of the steps: graduate with a head start.
        if card.current_step as i64 >= steps.len() as i64 - 2 {
          self.graduate(card, self.config.easy_graduation_interval_minutes);
        } else {
          card.current_step = steps.len() - 2;
          card.set_interval_minutes(steps[card.current_step]);
          if card.state == CardState::New {
            card.state = CardState::Learning;
          }
        }
      }
    }
  }

  /// Graduated cards: lapse back into relearning, or grow by the
  /// decision-specific multiplier.
  fn advance_review(&self, card: &mut CardRecord, decision: Decision) {
    match decision {
      Decision::Again => {
        card.state = CardState::Relearning;
        card.current_step = 0;
        card.set_interval_minutes(self.config.learning_steps[0]);
        card.repetitions = 0;
        card.total_lapses += 1;
      }
      Decision::Hard | Decision::Good | Decision::Easy => {
        card.repetitions += 1;
        let multiplier = match decision {
          Decision::Hard => HARD_INTERVAL_MULTIPLIER,
          Decision::Good => card.easiness_factor,
          _ => card.easiness_factor * EASY_INTERVAL_BONUS,
        };
        let days = ((card.interval_days as f64) * multiplier).round() as i64;
        card.set_interval_days(days.max(1));
      }
    }
  }

  fn graduate(&self, card: &mut CardRecord, interval_minutes: i64) {
    card.state = CardState::Review;
    card.set_interval_minutes(interval_minutes);
    card.current_step = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
  }

  fn scheduler() -> Scheduler {
    Scheduler::new(SrsConfig::default())
  }

  fn scheduler_with_steps(steps: Vec<i64>) -> Scheduler {
    Scheduler::new(SrsConfig {
      learning_steps: steps,
      ..SrsConfig::default()
    })
  }

  fn new_card(s: &Scheduler) -> CardRecord {
    s.init_card("learner-1", 42, fixed_now())
  }

  fn review_card(s: &Scheduler, interval_days: i64) -> CardRecord {
    let mut card = new_card(s);
    card.state = CardState::Review;
    card.set_interval_days(interval_days);
    card.repetitions = 3;
    card
  }

  #[test]
  fn test_decision_from_score() {
    assert_eq!(Decision::from_score(0), Decision::Again);
    assert_eq!(Decision::from_score(1), Decision::Again);
    assert_eq!(Decision::from_score(2), Decision::Again);
    assert_eq!(Decision::from_score(3), Decision::Hard);
    assert_eq!(Decision::from_score(4), Decision::Good);
    assert_eq!(Decision::from_score(5), Decision::Easy);
  }

  #[test]
  fn test_scores_outside_range_are_clamped() {
    let s = scheduler();
    let card = new_card(&s);
    let high = s.advance(&card, 9, fixed_now());
    let easy = s.advance(&card, 5, fixed_now());
    assert_eq!(high.quality, Some(5));
    assert_eq!(high.interval_minutes, easy.interval_minutes);

    let low = s.advance(&card, -3, fixed_now());
    assert_eq!(low.quality, Some(0));
    assert_eq!(low.total_lapses, 1);
  }

  #[test]
  fn test_new_card_fail_enters_learning() {
    let s = scheduler();
    let card = new_card(&s);
    let next = s.advance(&card, 0, fixed_now());
    assert_eq!(next.state, CardState::Learning);
    assert_eq!(next.current_step, 0);
    assert_eq!(next.interval_minutes, 10);
    assert_eq!(next.repetitions, 0);
    assert_eq!(next.total_lapses, 1);
    assert_eq!(next.total_reviews, 1);
  }

  #[test]
  fn test_relearning_fail_stays_relearning() {
    let s = scheduler();
    let mut card = new_card(&s);
    card.state = CardState::Relearning;
    let next = s.advance(&card, 2, fixed_now());
    assert_eq!(next.state, CardState::Relearning);
    assert_eq!(next.total_lapses, 1);
  }

  #[test]
  fn test_hard_steps_back_but_not_below_zero() {
    let s = scheduler_with_steps(vec![1, 10, 60, 240]);
    let mut card = new_card(&s);
    card.state = CardState::Learning;
    card.current_step = 2;

    let next = s.advance(&card, 3, fixed_now());
    assert_eq!(next.current_step, 1);
    assert_eq!(next.interval_minutes, 10);
    assert_eq!(next.repetitions, 1);

    let floored = s.advance(&{
      let mut c = card.clone();
      c.current_step = 0;
      c
    }, 3, fixed_now());
    assert_eq!(floored.current_step, 0);
    assert_eq!(floored.interval_minutes, 1);
  }

  #[test]
  fn test_good_walks_steps_then_graduates() {
    let s = scheduler_with_steps(vec![1, 10, 60]);
    let mut card = new_card(&s);

    card = s.advance(&card, 4, fixed_now());
    assert_eq!(card.state, CardState::Learning);
    assert_eq!(card.current_step, 1);
    assert_eq!(card.interval_minutes, 10);

    card = s.advance(&card, 4, fixed_now());
    assert_eq!(card.current_step, 2);
    assert_eq!(card.interval_minutes, 60);

    card = s.advance(&card, 4, fixed_now());
    assert_eq!(card.state, CardState::Review);
    assert_eq!(card.interval_minutes, 1440);
    assert_eq!(card.interval_days, 1);
    assert_eq!(card.current_step, 0);
    assert_eq!(card.repetitions, 3);
  }

  #[test]
  fn test_single_step_good_graduates_immediately() {
    let s = scheduler();
    let card = new_card(&s);
    let next = s.advance(&card, 4, fixed_now());
    assert_eq!(next.state, CardState::Review);
    assert_eq!(next.interval_minutes, 1440);
  }

  #[test]
  fn test_easy_graduates_with_longer_interval() {
    let s = scheduler();
    let card = new_card(&s);
    let next = s.advance(&card, 5, fixed_now());
    assert_eq!(next.state, CardState::Review);
    assert_eq!(next.interval_minutes, 2880);
    assert_eq!(next.interval_days, 2);
  }

  #[test]
  fn test_easy_early_in_long_sequence_jumps_ahead() {
    let s = scheduler_with_steps(vec![1, 10, 60, 240]);
    let card = new_card(&s);
    let next = s.advance(&card, 5, fixed_now());
    // Jumps to the second-to-last step instead of graduating
    assert_eq!(next.state, CardState::Learning);
    assert_eq!(next.current_step, 2);
    assert_eq!(next.interval_minutes, 60);
  }

  #[test]
  fn test_easy_near_end_of_sequence_graduates() {
    let s = scheduler_with_steps(vec![1, 10, 60, 240]);
    let mut card = new_card(&s);
    card.state = CardState::Learning;
    card.current_step = 2;
    let next = s.advance(&card, 5, fixed_now());
    assert_eq!(next.state, CardState::Review);
    assert_eq!(next.interval_minutes, 2880);
  }

  #[test]
  fn test_review_hard_multiplies_by_fixed_factor() {
    let s = scheduler();
    let card = review_card(&s, 10);
    let next = s.advance(&card, 3, fixed_now());
    // round(10 * 1.2) = 12
    assert_eq!(next.interval_days, 12);
    assert_eq!(next.interval_minutes, 12 * 1440);
    assert_eq!(next.state, CardState::Review);
    assert_eq!(next.repetitions, 4);
  }

  #[test]
  fn test_review_good_multiplies_by_ease_factor() {
    let s = scheduler();
    let card = review_card(&s, 10);
    // Multiplier is the pre-review ease factor: round(10 * 2.5) = 25
    let next = s.advance(&card, 4, fixed_now());
    assert_eq!(next.interval_days, 25);
  }

  #[test]
  fn test_review_easy_applies_bonus() {
    let s = scheduler();
    let card = review_card(&s, 10);
    // round(10 * 2.5 * 1.3) = round(32.5) = 33 (round half away from zero)
    let next = s.advance(&card, 5, fixed_now());
    assert_eq!(next.interval_days, 33);
  }

  #[test]
  fn test_review_interval_never_drops_below_one_day() {
    let s = scheduler();
    let mut card = review_card(&s, 1);
    card.easiness_factor = MIN_EASE_FACTOR;
    let next = s.advance(&card, 3, fixed_now());
    assert!(next.interval_days >= 1);
  }

  #[test]
  fn test_review_lapse_enters_relearning() {
    let s = scheduler();
    let card = review_card(&s, 15);
    let next = s.advance(&card, 1, fixed_now());
    assert_eq!(next.state, CardState::Relearning);
    assert_eq!(next.current_step, 0);
    assert_eq!(next.interval_minutes, 10);
    assert_eq!(next.repetitions, 0);
    assert_eq!(next.total_lapses, card.total_lapses + 1);
  }

  #[test]
  fn test_ease_factor_floor_holds_under_repeated_failure() {
    let s = scheduler();
    let mut card = new_card(&s);
    for _ in 0..10 {
      card = s.advance(&card, 0, fixed_now());
      assert!(card.easiness_factor >= MIN_EASE_FACTOR);
    }
    assert!((card.easiness_factor - MIN_EASE_FACTOR).abs() < 1e-9);
  }

  #[test]
  fn test_ease_factor_updates_in_learning_phase_too() {
    let s = scheduler();
    let card = new_card(&s);
    let next = s.advance(&card, 0, fixed_now());
    assert!(next.easiness_factor < card.easiness_factor);

    let eased = s.advance(&card, 5, fixed_now());
    assert!(eased.easiness_factor > card.easiness_factor);
  }

  #[test]
  fn test_good_review_keeps_ease_factor() {
    let s = scheduler();
    let card = review_card(&s, 10);
    let next = s.advance(&card, 4, fixed_now());
    assert!((next.easiness_factor - 2.5).abs() < 1e-9);
  }

  #[test]
  fn test_next_review_at_uses_minute_interval() {
    let s = scheduler();
    let now = fixed_now();
    let card = new_card(&s);
    let next = s.advance(&card, 3, now);
    assert_eq!(next.next_review_at, now + Duration::minutes(10));
    assert_eq!(next.last_reviewed_at, Some(now));

    let graduated = s.advance(&card, 4, now);
    assert_eq!(graduated.next_review_at, now + Duration::minutes(1440));
  }

  #[test]
  fn test_empty_step_sequence_falls_back_to_default() {
    let s = scheduler_with_steps(vec![]);
    assert_eq!(s.config().learning_steps, vec![10]);

    // Both indexing branches survive
    let card = new_card(&s);
    let lapsed = s.advance(&card, 0, fixed_now());
    assert_eq!(lapsed.interval_minutes, 10);
    let hard = s.advance(&card, 3, fixed_now());
    assert_eq!(hard.interval_minutes, 10);
  }

  #[test]
  fn test_reviewed_learning_card_unsuspends_to_learning() {
    let s = scheduler();
    let now = fixed_now();

    // Fail the first review: Learning on the 10-minute step, which
    // displays as a one-day interval.
    let mut card = s.advance(&new_card(&s), 0, now);
    assert_eq!(card.state, CardState::Learning);
    assert_eq!(card.interval_days, 1);

    card.suspend();
    card.unsuspend();
    assert_eq!(card.state, CardState::Learning);
  }

  #[test]
  fn test_graduated_card_unsuspends_to_review() {
    let s = scheduler();
    let mut card = s.advance(&new_card(&s), 4, fixed_now());
    assert_eq!(card.state, CardState::Review);

    card.suspend();
    card.unsuspend();
    assert_eq!(card.state, CardState::Review);
  }

  #[test]
  fn test_suspended_card_is_frozen() {
    let s = scheduler();
    let mut card = review_card(&s, 10);
    card.suspend();
    let next = s.advance(&card, 4, fixed_now());
    assert_eq!(next.state, CardState::Suspended);
    assert_eq!(next.total_reviews, card.total_reviews);
    assert_eq!(next.next_review_at, card.next_review_at);
  }

  #[test]
  fn test_invariants_hold_across_mixed_sequence() {
    let s = scheduler_with_steps(vec![1, 10, 60, 240]);
    let mut card = new_card(&s);
    let mut now = fixed_now();
    for score in [4, 0, 3, 4, 4, 5, 2, 4, 4, 4, 5, 0, 3, 4, 7, -1] {
      now += Duration::minutes(30);
      card = s.advance(&card, score, now);
      assert!(card.easiness_factor >= MIN_EASE_FACTOR);
      assert!(card.interval_minutes >= 0);
      assert!(card.total_lapses <= card.total_reviews);
      assert!(card.current_step < s.config().learning_steps.len());
      assert!(card.interval_days > 0 || card.interval_minutes == 0);
    }
    assert_eq!(card.total_reviews, 16);
  }
}
