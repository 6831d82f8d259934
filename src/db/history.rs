//! Attempt history: one row per scored submission.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};
use serde::Serialize;

use crate::domain::CardRecord;

#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub learner_id: String,
    pub question_id: i64,
    pub answer: String,
    pub score: i64,
    pub feedback: Option<String>,
    pub card_state: String,
    pub interval_minutes: i64,
    pub interval_days: i64,
    pub next_review_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

/// Record a scored submission alongside the card state it produced.
pub fn insert_attempt(
    conn: &Connection,
    card: &CardRecord,
    answer: &str,
    score: i64,
    feedback: Option<&str>,
    submitted_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO attempts (learner_id, question_id, answer, score, feedback, card_state,
                          interval_minutes, interval_days, next_review_at, submitted_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
        params![
            card.learner_id,
            card.question_id,
            answer,
            score,
            feedback,
            card.state.as_str(),
            card.interval_minutes,
            card.interval_days,
            card.next_review_at.to_rfc3339(),
            submitted_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_attempts(conn: &Connection, learner_id: &str, limit: i64) -> Result<Vec<Attempt>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, learner_id, question_id, answer, score, feedback, card_state,
           interval_minutes, interval_days, next_review_at, submitted_at
    FROM attempts
    WHERE learner_id = ?1
    ORDER BY submitted_at DESC, id DESC
    LIMIT ?2
    "#,
    )?;

    let attempts = stmt
        .query_map(params![learner_id, limit], row_to_attempt)?
        .collect::<Result<Vec<_>>>()?;
    Ok(attempts)
}

pub fn count_attempts_today(
    conn: &Connection,
    learner_id: &str,
    now: DateTime<Utc>,
) -> Result<i64> {
    let today_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .to_rfc3339();
    conn.query_row(
        "SELECT COUNT(*) FROM attempts WHERE learner_id = ?1 AND submitted_at >= ?2",
        params![learner_id, today_start],
        |row| row.get(0),
    )
}

fn row_to_attempt(row: &rusqlite::Row) -> Result<Attempt> {
    let next_review_str: String = row.get(9)?;
    let submitted_str: String = row.get(10)?;
    Ok(Attempt {
        id: row.get(0)?,
        learner_id: row.get(1)?,
        question_id: row.get(2)?,
        answer: row.get(3)?,
        score: row.get(4)?,
        feedback: row.get(5)?,
        card_state: row.get(6)?,
        interval_minutes: row.get(7)?,
        interval_days: row.get(8)?,
        next_review_at: parse(&next_review_str),
        submitted_at: parse(&submitted_str),
    })
}

fn parse(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn card(now: DateTime<Utc>) -> CardRecord {
        let mut card = CardRecord::new("learner-1".to_string(), 1, now);
        card.set_interval_minutes(10);
        card
    }

    #[test]
    fn test_attempts_come_back_newest_first() {
        let env = TestEnv::new().unwrap();
        env.seed_questions(1);
        let now = fixed_now();
        let card = card(now);

        insert_attempt(&env.conn, &card, "first", 2, Some("lapse"), now - Duration::hours(1))
            .unwrap();
        insert_attempt(&env.conn, &card, "second", 4, Some("good"), now).unwrap();

        let attempts = get_attempts(&env.conn, "learner-1", 10).unwrap();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].answer, "second");
        assert_eq!(attempts[0].score, 4);
        assert_eq!(attempts[1].feedback.as_deref(), Some("lapse"));
    }

    #[test]
    fn test_count_attempts_today_ignores_yesterday() {
        let env = TestEnv::new().unwrap();
        env.seed_questions(1);
        let now = fixed_now();
        let card = card(now);

        insert_attempt(&env.conn, &card, "old", 3, None, now - Duration::days(1)).unwrap();
        insert_attempt(&env.conn, &card, "new", 4, None, now).unwrap();

        assert_eq!(count_attempts_today(&env.conn, "learner-1", now).unwrap(), 1);
    }
}
