use rusqlite::{OptionalExtension, params};

use crate::db::Database;
use crate::error::ApiError;
use crate::rate_limit;

pub const MAX_NAME_CHARS: usize = 99;
pub const MAX_KEY_CHARS: usize = 99;
pub const MAX_CONTENT_CHARS: usize = 10_000;

// Current content for a name, or None if no note exists
pub fn get(db: &Database, name: &str) -> Result<Option<String>, ApiError> {
    let conn = db.lock();
    let content = conn
        .query_row(
            "SELECT content FROM notes WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(content)
}

pub fn count(db: &Database) -> Result<i64, ApiError> {
    let conn = db.lock();
    Ok(conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?)
}

// Full replace of the note row. Validation runs first (cheapest check), then
// the key capability check, then the per-IP rate gate; only an attempt that
// clears all three lands in the table. The whole sequence runs inside one
// transaction while holding the connection lock.
pub fn save(
    db: &Database,
    name: &str,
    content: &str,
    key: &str,
    ip: &str,
    now: i64,
    min_interval: i64,
) -> Result<(), ApiError> {
    let name_len = name.chars().count();
    if name_len < 1 || name_len > MAX_NAME_CHARS {
        return Err(ApiError::Validation(
            "Note name length must be between 1 and 100 characters",
        ));
    }
    if key.chars().count() > MAX_KEY_CHARS {
        return Err(ApiError::Validation(
            "Note key length must be under 100 characters",
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::Validation(
            "Note length must be under 10K characters",
        ));
    }

    let mut conn = db.lock();
    let tx = conn.transaction()?;

    let saved_key: Option<String> = tx
        .query_row(
            "SELECT key FROM notes WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(saved) = saved_key {
        if saved != key {
            return Err(ApiError::KeyMismatch("Note already saved with different key"));
        }
    }

    rate_limit::gate(&tx, ip, now, min_interval)?;

    tx.execute(
        "REPLACE INTO notes (name, content, key, author_ip, last_write)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, content, key, ip, now],
    )?;
    tx.commit()?;
    Ok(())
}

// Not rate limited. Removing a nonexistent note still reports success.
pub fn delete(db: &Database, name: &str, key: &str) -> Result<(), ApiError> {
    let conn = db.lock();

    let saved_key: Option<String> = conn
        .query_row(
            "SELECT key FROM notes WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(saved) = saved_key {
        if saved != key {
            return Err(ApiError::KeyMismatch("Incorrect key"));
        }
    }

    conn.execute("DELETE FROM notes WHERE name = ?1", params![name])?;
    Ok(())
}
