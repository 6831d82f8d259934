//! Per-learner settings

use rusqlite::{params, Connection, OptionalExtension, Result};

pub fn get_new_cards_limit(conn: &Connection, learner_id: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT new_cards_limit FROM learner_settings WHERE learner_id = ?1",
        params![learner_id],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_new_cards_limit(conn: &Connection, learner_id: &str, limit: i64) -> Result<()> {
    conn.execute(
        r#"
    INSERT INTO learner_settings (learner_id, new_cards_limit)
    VALUES (?1, ?2)
    ON CONFLICT (learner_id) DO UPDATE SET new_cards_limit = excluded.new_cards_limit
    "#,
        params![learner_id, limit],
    )?;
    Ok(())
}
