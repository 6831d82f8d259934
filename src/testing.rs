//! Shared test fixtures: an in-memory database with the full schema applied.

use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, Result};

pub struct TestEnv {
  pub conn: Connection,
}

impl TestEnv {
  pub fn new() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    crate::db::run_migrations(&conn)?;
    Ok(Self { conn })
  }

  /// Insert `n` questions with sequential ids 1..=n.
  pub fn seed_questions(&self, n: i64) {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    for i in 1..=n {
      self
        .conn
        .execute(
          r#"
      INSERT INTO questions (id, title, slug, difficulty, statement, topics, created_at)
      VALUES (?1, ?2, ?3, 'Easy', 'statement', '["array"]', ?4)
      "#,
          params![
            i,
            format!("Question {}", i),
            format!("question-{}", i),
            created.to_rfc3339(),
          ],
        )
        .unwrap();
    }
  }
}
