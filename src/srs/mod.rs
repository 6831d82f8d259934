pub mod queue;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod store;

pub use queue::{ensure_queue, ReplenishOutcome};
pub use scheduler::{clamp_score, Decision, Scheduler, MIN_EASE_FACTOR};
pub use selector::{select_next, CardKind, NextCard, Selection};
pub use session::{apply_review, apply_skip, SessionError, SKIP_SCORE};
pub use store::{CardStore, StoreError, StoreResult};
