pub mod card;
pub mod question;

pub use card::{
  interval_days_from_minutes, CardRecord, CardState, INITIAL_EASE_FACTOR, MATURE_INTERVAL_DAYS,
  MINUTES_PER_DAY,
};
pub use question::Question;
