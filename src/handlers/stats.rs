use axum::extract::State;
use std::sync::Arc;

use crate::error::ApiError;
use crate::notes;
use crate::rate_limit;
use crate::state::AppState;
use crate::visits;

const TOP_PATHS: usize = 5;

// Write endpoints stay out of the public report
const HIDDEN_PREFIXES: &[&str] = &["/save/"];

// Fixed-order plain-text report: visitors, notes, authors, then the
// most-visited paths with their distinct visitor counts.
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    let visitors = visits::visitor_count(&state.db)?;
    let note_count = notes::count(&state.db)?;
    let authors = rate_limit::author_count(&state.db)?;
    let top = visits::top_paths(&state.db, TOP_PATHS, HIDDEN_PREFIXES)?;

    let mut report = format!(
        "Visitors: {visitors}\nNotes: {note_count}\nAuthors: {authors}\n\nTop paths:\n"
    );
    for (path, count) in top {
        report.push_str(&format!("{path}\t{count}\n"));
    }
    Ok(report)
}
