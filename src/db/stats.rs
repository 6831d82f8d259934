//! Aggregate counts shown alongside scheduling decisions.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};
use serde::Serialize;

/// Due counts per priority bucket, plus today's new-card progress.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DueCounts {
    pub learning_due: i64,
    pub reviews_due: i64,
    pub new_available: i64,
    pub new_studied_today: i64,
}

pub fn get_due_counts(
    conn: &Connection,
    learner_id: &str,
    now: DateTime<Utc>,
) -> Result<DueCounts> {
    let now_str = now.to_rfc3339();

    let learning_due = conn.query_row(
        r#"
    SELECT COUNT(*) FROM cards
    WHERE learner_id = ?1
      AND state IN ('learning', 'relearning')
      AND next_review_at <= ?2
    "#,
        params![learner_id, now_str],
        |row| row.get(0),
    )?;

    let reviews_due = conn.query_row(
        r#"
    SELECT COUNT(*) FROM cards
    WHERE learner_id = ?1 AND state = 'review' AND next_review_at <= ?2
    "#,
        params![learner_id, now_str],
        |row| row.get(0),
    )?;

    let new_available = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE learner_id = ?1 AND state = 'new'",
        params![learner_id],
        |row| row.get(0),
    )?;

    // Cards drawn today that have moved past the New state
    let today_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .to_rfc3339();
    let new_studied_today = conn.query_row(
        r#"
    SELECT COUNT(*) FROM cards
    WHERE learner_id = ?1 AND state != 'new' AND created_at >= ?2
    "#,
        params![learner_id, today_start],
        |row| row.get(0),
    )?;

    Ok(DueCounts {
        learning_due,
        reviews_due,
        new_available,
        new_studied_today,
    })
}

/// Count of graduated cards with intervals past the maturity threshold.
pub fn count_mature_cards(conn: &Connection, learner_id: &str) -> Result<i64> {
    conn.query_row(
        r#"
    SELECT COUNT(*) FROM cards
    WHERE learner_id = ?1 AND state = 'review' AND interval_days > ?2
    "#,
        params![learner_id, crate::domain::MATURE_INTERVAL_DAYS],
        |row| row.get(0),
    )
}
