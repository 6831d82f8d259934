//! Question catalog CRUD

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::Question;

pub fn insert_question(conn: &Connection, question: &Question) -> Result<i64> {
    let topics = serde_json::to_string(&question.topics)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    // RETURNING yields the existing row's id on the conflict path, where
    // last_insert_rowid() would report an unrelated earlier insert.
    conn.query_row(
        r#"
    INSERT INTO questions (title, slug, difficulty, statement, topics, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT (slug) DO UPDATE SET
        title = excluded.title,
        difficulty = excluded.difficulty,
        statement = excluded.statement,
        topics = excluded.topics
    RETURNING id
    "#,
        params![
            question.title,
            question.slug,
            question.difficulty,
            question.statement,
            topics,
            question.created_at.to_rfc3339(),
        ],
        |row| row.get(0),
    )
}

pub fn get_question_by_id(conn: &Connection, id: i64) -> Result<Option<Question>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, slug, difficulty, statement, topics, created_at FROM questions WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_question(row)?)),
        None => Ok(None),
    }
}

pub fn count_questions(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))
}

/// Convert a database row to a Question struct
pub(crate) fn row_to_question(row: &rusqlite::Row) -> Result<Question> {
    let topics_json: String = row.get(5)?;
    let created_str: String = row.get(6)?;
    Ok(Question {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        difficulty: row.get(3)?,
        statement: row.get(4)?,
        topics: serde_json::from_str(&topics_json).unwrap_or_default(),
        created_at: DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;

    fn sample(slug: &str) -> Question {
        Question {
            id: 0,
            title: "Two Sum".to_string(),
            slug: slug.to_string(),
            difficulty: "Easy".to_string(),
            statement: "Given an array of integers...".to_string(),
            topics: vec!["array".to_string(), "hash-table".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_fetch() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let id = insert_question(&conn, &sample("two-sum")).unwrap();
        let fetched = get_question_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(fetched.title, "Two Sum");
        assert_eq!(fetched.topics, vec!["array", "hash-table"]);
    }

    #[test]
    fn test_reingesting_a_slug_updates_in_place() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let first = insert_question(&conn, &sample("two-sum")).unwrap();
        // An intervening insert must not bleed into the conflict path's id
        insert_question(&conn, &sample("three-sum")).unwrap();

        let mut updated = sample("two-sum");
        updated.statement = "Updated statement".to_string();
        let reingested = insert_question(&conn, &updated).unwrap();

        assert_eq!(reingested, first);
        assert_eq!(count_questions(&conn).unwrap(), 2);
        let fetched = get_question_by_id(&conn, first).unwrap().unwrap();
        assert_eq!(fetched.statement, "Updated statement");
    }

    #[test]
    fn test_missing_question_is_none() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert!(get_question_by_id(&conn, 42).unwrap().is_none());
    }
}
