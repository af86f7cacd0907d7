use crate::db::Database;

// App's shared state
pub struct AppState {
    pub db: Database,        // single SQLite handle behind a mutex
    pub write_interval: i64, // minimum seconds between writes per IP
}
