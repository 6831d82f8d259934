use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS questions (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      slug TEXT NOT NULL UNIQUE,
      difficulty TEXT NOT NULL,
      statement TEXT NOT NULL,
      topics TEXT NOT NULL DEFAULT '[]',
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      learner_id TEXT NOT NULL,
      question_id INTEGER NOT NULL,
      state TEXT NOT NULL DEFAULT 'new',
      quality INTEGER,
      easiness_factor REAL NOT NULL DEFAULT 2.5,
      interval_days INTEGER NOT NULL DEFAULT 0,
      interval_minutes INTEGER NOT NULL DEFAULT 0,
      current_step INTEGER NOT NULL DEFAULT 0,
      repetitions INTEGER NOT NULL DEFAULT 0,
      next_review_at TEXT NOT NULL,
      last_reviewed_at TEXT,
      total_reviews INTEGER NOT NULL DEFAULT 0,
      total_lapses INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL,
      UNIQUE (learner_id, question_id),
      FOREIGN KEY (question_id) REFERENCES questions(id)
    );

    CREATE TABLE IF NOT EXISTS attempts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      learner_id TEXT NOT NULL,
      question_id INTEGER NOT NULL,
      answer TEXT NOT NULL,
      score INTEGER NOT NULL,
      feedback TEXT,
      card_state TEXT NOT NULL,
      interval_minutes INTEGER NOT NULL,
      interval_days INTEGER NOT NULL,
      next_review_at TEXT NOT NULL,
      submitted_at TEXT NOT NULL,
      FOREIGN KEY (question_id) REFERENCES questions(id)
    );

    CREATE TABLE IF NOT EXISTS learner_settings (
      learner_id TEXT PRIMARY KEY,
      new_cards_limit INTEGER NOT NULL
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_cards_learner_state ON cards(learner_id, state);
    CREATE INDEX IF NOT EXISTS idx_cards_learner_next_review ON cards(learner_id, next_review_at);
    CREATE INDEX IF NOT EXISTS idx_cards_learner_created ON cards(learner_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_attempts_learner_submitted ON attempts(learner_id, submitted_at);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: sub-day scheduling (minutes became the canonical unit)
  add_column_if_missing(conn, "cards", "interval_minutes", "INTEGER NOT NULL DEFAULT 0")?;
  add_column_if_missing(conn, "cards", "current_step", "INTEGER NOT NULL DEFAULT 0")?;

  // Backfill interval_minutes for databases that predate sub-day scheduling
  conn.execute(
    "UPDATE cards SET interval_minutes = interval_days * 1440 WHERE interval_minutes = 0 AND interval_days > 0",
    [],
  )?;

  // Migration: attempts gained the resulting schedule columns
  add_column_if_missing(conn, "attempts", "interval_minutes", "INTEGER NOT NULL DEFAULT 0")?;
  add_column_if_missing(conn, "attempts", "interval_days", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  let query = format!("SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?1", table);
  conn
    .query_row(&query, [column], |row| row.get::<_, i64>(0))
    .map(|count| count > 0)
    .unwrap_or(false)
}

fn add_column_if_missing(
  conn: &Connection,
  table: &str,
  column: &str,
  definition: &str,
) -> Result<()> {
  if !column_exists(conn, table, column) {
    let query = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition);
    conn.execute(&query, [])?;
  }
  Ok(())
}
