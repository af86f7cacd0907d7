use clap::Parser;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "notehost")]
#[command(about = "Minimal note-hosting service with per-IP write pacing")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // SQLite file holding notes, writers and visits
    #[arg(short, long, default_value = "notes.db")]
    pub db_path: String,

    // Minimum seconds between accepted writes from one client IP
    #[arg(long, default_value_t = 10)]
    pub write_interval: i64,
}
