//! Application state passed to all handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::db::DbPool;
use crate::grading::LlmGrader;
use crate::srs::Scheduler;

#[derive(Clone)]
pub struct AppState {
  /// Shared database connection
  pub pool: DbPool,

  /// Interval engine, configured once at startup
  pub scheduler: Arc<Scheduler>,

  /// External grading service
  pub grader: Arc<LlmGrader>,

  /// Refill signal target; None disables the signal
  pub catalog: Option<Arc<CatalogClient>>,
}

impl AppState {
  pub fn new(
    pool: DbPool,
    scheduler: Scheduler,
    grader: LlmGrader,
    catalog: Option<CatalogClient>,
  ) -> Self {
    Self {
      pool,
      scheduler: Arc::new(scheduler),
      grader: Arc::new(grader),
      catalog: catalog.map(Arc::new),
    }
  }
}
