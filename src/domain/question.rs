use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A problem from the catalog. Content ingestion lives behind the catalog
/// collaborator; the scheduler only ever sees materialized rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id: i64,
  pub title: String,
  pub slug: String,
  pub difficulty: String,
  /// Problem statement as Markdown.
  pub statement: String,
  pub topics: Vec<String>,
  pub created_at: DateTime<Utc>,
}
