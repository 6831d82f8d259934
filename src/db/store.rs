//! Card record queries and the [`CardStore`] implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::{CardRecord, CardState};
use crate::srs::store::{CardStore, StoreError, StoreResult};

use super::questions::row_to_question;

const CARD_COLUMNS: &str = "id, learner_id, question_id, state, quality, easiness_factor, \
     interval_days, interval_minutes, current_step, repetitions, next_review_at, \
     last_reviewed_at, total_reviews, total_lapses, created_at";

/// rusqlite-backed [`CardStore`]. Holds a borrowed connection; callers own
/// the pool lock for the duration of a scheduling operation, which gives the
/// at-most-one in-flight mutation per card the engine assumes.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn store_err(e: rusqlite::Error) -> StoreError {
    StoreError::new(e.to_string())
}

/// Quote a state list for an IN (...) clause.
fn state_list(states: &[CardState]) -> String {
    states
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

fn today_start(now: DateTime<Utc>) -> String {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .to_rfc3339()
}

/// Convert a database row to a CardRecord
pub(crate) fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<CardRecord> {
    let state_str: String = row.get(3)?;
    let next_review_str: String = row.get(10)?;
    let last_reviewed_str: Option<String> = row.get(11)?;
    let created_str: String = row.get(14)?;
    let current_step: i64 = row.get(8)?;

    Ok(CardRecord {
        id: row.get(0)?,
        learner_id: row.get(1)?,
        question_id: row.get(2)?,
        state: CardState::from_str(&state_str),
        quality: row.get(4)?,
        easiness_factor: row.get(5)?,
        interval_days: row.get(6)?,
        interval_minutes: row.get(7)?,
        current_step: current_step.max(0) as usize,
        repetitions: row.get(9)?,
        next_review_at: parse_timestamp(&next_review_str),
        last_reviewed_at: last_reviewed_str.as_deref().map(parse_timestamp),
        total_reviews: row.get(12)?,
        total_lapses: row.get(13)?,
        created_at: parse_timestamp(&created_str),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl CardStore for SqliteStore<'_> {
    fn question_unseen_by(&self, learner_id: &str) -> StoreResult<Option<crate::domain::Question>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
        SELECT q.id, q.title, q.slug, q.difficulty, q.statement, q.topics, q.created_at
        FROM questions q
        WHERE NOT EXISTS (
            SELECT 1 FROM cards c
            WHERE c.learner_id = ?1 AND c.question_id = q.id
        )
        ORDER BY RANDOM()
        LIMIT 1
        "#,
            )
            .map_err(store_err)?;

        let mut rows = stmt.query(params![learner_id]).map_err(store_err)?;
        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_question(row).map_err(store_err)?)),
            None => Ok(None),
        }
    }

    fn unseen_count(&self, learner_id: &str) -> StoreResult<i64> {
        self.conn
            .query_row(
                r#"
        SELECT COUNT(*)
        FROM questions q
        WHERE NOT EXISTS (
            SELECT 1 FROM cards c
            WHERE c.learner_id = ?1 AND c.question_id = q.id
        )
        "#,
                params![learner_id],
                |row| row.get(0),
            )
            .map_err(store_err)
    }

    fn card_for(&self, learner_id: &str, question_id: i64) -> StoreResult<Option<CardRecord>> {
        let query = format!(
            "SELECT {} FROM cards WHERE learner_id = ?1 AND question_id = ?2",
            CARD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query).map_err(store_err)?;
        let mut rows = stmt.query(params![learner_id, question_id]).map_err(store_err)?;
        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_card(row).map_err(store_err)?)),
            None => Ok(None),
        }
    }

    fn create_card(&self, card: &CardRecord) -> StoreResult<CardRecord> {
        self.conn
            .execute(
                r#"
        INSERT INTO cards (learner_id, question_id, state, quality, easiness_factor,
                           interval_days, interval_minutes, current_step, repetitions,
                           next_review_at, last_reviewed_at, total_reviews, total_lapses,
                           created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
                params![
                    card.learner_id,
                    card.question_id,
                    card.state.as_str(),
                    card.quality,
                    card.easiness_factor,
                    card.interval_days,
                    card.interval_minutes,
                    card.current_step as i64,
                    card.repetitions,
                    card.next_review_at.to_rfc3339(),
                    card.last_reviewed_at.map(|dt| dt.to_rfc3339()),
                    card.total_reviews,
                    card.total_lapses,
                    card.created_at.to_rfc3339(),
                ],
            )
            .map_err(store_err)?;

        let mut created = card.clone();
        created.id = self.conn.last_insert_rowid();
        Ok(created)
    }

    fn update_card(&self, card: &CardRecord) -> StoreResult<()> {
        let changed = self
            .conn
            .execute(
                r#"
        UPDATE cards
        SET state = ?1, quality = ?2, easiness_factor = ?3, interval_days = ?4,
            interval_minutes = ?5, current_step = ?6, repetitions = ?7,
            next_review_at = ?8, last_reviewed_at = ?9, total_reviews = ?10,
            total_lapses = ?11
        WHERE id = ?12
        "#,
                params![
                    card.state.as_str(),
                    card.quality,
                    card.easiness_factor,
                    card.interval_days,
                    card.interval_minutes,
                    card.current_step as i64,
                    card.repetitions,
                    card.next_review_at.to_rfc3339(),
                    card.last_reviewed_at.map(|dt| dt.to_rfc3339()),
                    card.total_reviews,
                    card.total_lapses,
                    card.id,
                ],
            )
            .map_err(store_err)?;

        if changed == 0 {
            return Err(StoreError::new(format!("card {} does not exist", card.id)));
        }
        Ok(())
    }

    fn count_cards_created_today(&self, learner_id: &str, now: DateTime<Utc>) -> StoreResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM cards WHERE learner_id = ?1 AND created_at >= ?2",
                params![learner_id, today_start(now)],
                |row| row.get(0),
            )
            .map_err(store_err)
    }

    fn count_cards_in_state(&self, learner_id: &str, state: CardState) -> StoreResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM cards WHERE learner_id = ?1 AND state = ?2",
                params![learner_id, state.as_str()],
                |row| row.get(0),
            )
            .map_err(store_err)
    }

    fn earliest_new(&self, learner_id: &str) -> StoreResult<Option<CardRecord>> {
        let query = format!(
            r#"
        SELECT {}
        FROM cards
        WHERE learner_id = ?1 AND state = 'new'
        ORDER BY created_at ASC, id ASC
        LIMIT 1
        "#,
            CARD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query).map_err(store_err)?;
        let mut rows = stmt.query(params![learner_id]).map_err(store_err)?;
        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_card(row).map_err(store_err)?)),
            None => Ok(None),
        }
    }

    fn earliest_due(
        &self,
        learner_id: &str,
        states: &[CardState],
        before: DateTime<Utc>,
    ) -> StoreResult<Option<CardRecord>> {
        if states.is_empty() {
            return Ok(None);
        }
        let query = format!(
            r#"
        SELECT {}
        FROM cards
        WHERE learner_id = ?1
          AND state IN ({})
          AND next_review_at <= ?2
        ORDER BY next_review_at ASC, id ASC
        LIMIT 1
        "#,
            CARD_COLUMNS,
            state_list(states)
        );
        let mut stmt = self.conn.prepare(&query).map_err(store_err)?;
        let mut rows = stmt
            .query(params![learner_id, before.to_rfc3339()])
            .map_err(store_err)?;
        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_card(row).map_err(store_err)?)),
            None => Ok(None),
        }
    }

    fn earliest_future_due(
        &self,
        learner_id: &str,
        after: DateTime<Utc>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let result: Option<String> = self
            .conn
            .query_row(
                r#"
        SELECT MIN(next_review_at)
        FROM cards
        WHERE learner_id = ?1
          AND state != 'suspended'
          AND next_review_at > ?2
        "#,
                params![learner_id, after.to_rfc3339()],
                |row| row.get(0),
            )
            .map_err(store_err)?;

        Ok(result.as_deref().map(parse_timestamp))
    }

    fn new_cards_limit(&self, learner_id: &str) -> StoreResult<Option<i64>> {
        super::settings::get_new_cards_limit(self.conn, learner_id).map_err(store_err)
    }
}
