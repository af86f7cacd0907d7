use rusqlite::{Connection, OptionalExtension, params};

use crate::db::Database;
use crate::error::ApiError;

// Minimum-interval write gate, one bucket per IP. The writers row only
// remembers the most recent accepted attempt, so pacing is one write per
// interval with no burst allowance and no window arithmetic.
//
// A denied attempt leaves the row untouched; an allowed one bumps
// write_count (monotonic, never reset) and stamps last_write. Callers run
// this inside their own transaction so the read-decide-update sequence
// cannot interleave with another writer on the same IP.
pub fn gate(conn: &Connection, ip: &str, now: i64, min_interval: i64) -> Result<(), ApiError> {
    let entry: Option<(i64, i64)> = conn
        .query_row(
            "SELECT write_count, last_write FROM writers WHERE ip = ?1",
            params![ip],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match entry {
        None => {
            conn.execute(
                "INSERT INTO writers (ip, write_count, last_write) VALUES (?1, 1, ?2)",
                params![ip, now],
            )?;
            Ok(())
        }
        Some((write_count, last_write)) => {
            if now - last_write < min_interval {
                return Err(ApiError::RateLimited);
            }
            conn.execute(
                "UPDATE writers SET write_count = ?1, last_write = ?2 WHERE ip = ?3",
                params![write_count + 1, now, ip],
            )?;
            Ok(())
        }
    }
}

// Distinct IPs that ever attempted a write, for the stats report
pub fn author_count(db: &Database) -> Result<i64, ApiError> {
    let conn = db.lock();
    Ok(conn.query_row("SELECT COUNT(*) FROM writers", [], |row| row.get(0))?)
}
