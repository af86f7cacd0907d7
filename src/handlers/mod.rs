mod health;
mod metrics;
mod notes;
mod stats;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use notes::{
    code_note, delete_note, delete_note_with_key, index, raw_note, save_note, save_note_with_key,
    texdown_note, view_note,
};
pub use stats::stats_handler;
