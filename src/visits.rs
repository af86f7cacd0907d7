use rusqlite::{params, params_from_iter};

use crate::db::Database;
use crate::error::ApiError;

// One row per (ip, path), bumped on every inbound request
pub fn record(db: &Database, ip: &str, path: &str) -> Result<(), ApiError> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO visits (ip, path, count) VALUES (?1, ?2, 1)
         ON CONFLICT (ip, path) DO UPDATE SET count = count + 1",
        params![ip, path],
    )?;
    Ok(())
}

pub fn visitor_count(db: &Database) -> Result<i64, ApiError> {
    let conn = db.lock();
    Ok(conn.query_row("SELECT COUNT(DISTINCT ip) FROM visits", [], |row| row.get(0))?)
}

// Most-visited paths by distinct visitor count, skipping any path under one
// of the excluded prefixes. Ties resolve by path order so the report is
// stable run to run.
pub fn top_paths(
    db: &Database,
    n: usize,
    exclude_prefixes: &[&str],
) -> Result<Vec<(String, i64)>, ApiError> {
    let mut sql = String::from("SELECT path, COUNT(ip) AS visitors FROM visits");
    if !exclude_prefixes.is_empty() {
        let clauses = vec!["path NOT LIKE ?"; exclude_prefixes.len()];
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(
        " GROUP BY path ORDER BY visitors DESC, path ASC LIMIT {n}"
    ));

    let patterns: Vec<String> = exclude_prefixes.iter().map(|p| format!("{p}%")).collect();

    let conn = db.lock();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(patterns.iter()), |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;

    let mut out = Vec::with_capacity(n);
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
