use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header;
use axum::{Extension, Form, Json};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::error::ApiError;
use crate::metrics::{WRITE_LATENCY, WRITES_ACCEPTED, WRITES_REJECTED};
use crate::middleware::ClientIp;
use crate::models::{NoteView, SavePayload};
use crate::notes;
use crate::state::AppState;

// Note content extracted from either a JSON body or a form field
pub struct NotePayload(pub String);

impl<S> FromRequest<S> for NotePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        let note = if json {
            Json::<SavePayload>::from_request(req, state)
                .await
                .map_err(|_| ApiError::Validation("Request body must carry a note field"))?
                .0
                .note
        } else {
            Form::<SavePayload>::from_request(req, state)
                .await
                .map_err(|_| ApiError::Validation("Request body must carry a note field"))?
                .0
                .note
        };
        Ok(NotePayload(note))
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let count = notes::count(&state.db)?;
    Ok(Json(serde_json::json!({ "notes": count })))
}

// The four read variants share one lookup; a missing note reads as empty
// content rather than a 404. Only the packaging differs per route.

pub async fn view_note(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    rendered(&state, name, "plain")
}

pub async fn code_note(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    rendered(&state, name, "code")
}

pub async fn texdown_note(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    rendered(&state, name, "texdown")
}

pub async fn raw_note(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<String, ApiError> {
    Ok(notes::get(&state.db, &name)?.unwrap_or_default())
}

fn rendered(state: &AppState, name: String, render: &'static str) -> Result<Json<NoteView>, ApiError> {
    let note = notes::get(&state.db, &name)?.unwrap_or_default();
    Ok(Json(NoteView { name, note, render }))
}

pub async fn save_note(
    State(state): State<Arc<AppState>>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    Path(name): Path<String>,
    NotePayload(note): NotePayload,
) -> Result<String, ApiError> {
    save_inner(&state, &ip, &name, "", &note)
}

pub async fn save_note_with_key(
    State(state): State<Arc<AppState>>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    Path((name, key)): Path<(String, String)>,
    NotePayload(note): NotePayload,
) -> Result<String, ApiError> {
    save_inner(&state, &ip, &name, &key, &note)
}

fn save_inner(
    state: &AppState,
    ip: &str,
    name: &str,
    key: &str,
    note: &str,
) -> Result<String, ApiError> {
    let start = Instant::now();
    let now = Utc::now().timestamp();

    let result = notes::save(&state.db, name, note, key, ip, now, state.write_interval);
    WRITE_LATENCY.observe(start.elapsed().as_secs_f64());

    match result {
        Ok(()) => {
            WRITES_ACCEPTED.inc();
            Ok(format!("Success! Note \"{name}\" saved\n"))
        }
        Err(e) => {
            WRITES_REJECTED.inc();
            debug!("write to {name} from {ip} rejected: {e}");
            Err(e)
        }
    }
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<String, ApiError> {
    delete_inner(&state, &name, "")
}

pub async fn delete_note_with_key(
    State(state): State<Arc<AppState>>,
    Path((name, key)): Path<(String, String)>,
) -> Result<String, ApiError> {
    delete_inner(&state, &name, &key)
}

fn delete_inner(state: &AppState, name: &str, key: &str) -> Result<String, ApiError> {
    notes::delete(&state.db, name, key)?;
    Ok(format!("Success! Note \"{name}\" deleted\n"))
}
