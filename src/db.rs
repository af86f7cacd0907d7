use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notes (
    name TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    key TEXT NOT NULL,
    author_ip TEXT NOT NULL,
    last_write INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS writers (
    ip TEXT PRIMARY KEY,
    write_count INTEGER NOT NULL,
    last_write INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS visits (
    ip TEXT NOT NULL,
    path TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (ip, path)
);
";

// Single SQLite handle shared by every request. The mutex is the write lock:
// each logical operation holds it for its whole check-then-act sequence, so
// key checks and rate-gate updates never interleave between two requests.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // Cheap liveness probe for the health endpoint
    pub fn ping(&self) -> bool {
        self.lock()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}
