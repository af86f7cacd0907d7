use serde::{Deserialize, Serialize};

// Save request body, as JSON or a form field
#[derive(Deserialize)]
pub struct SavePayload {
    pub note: String,
}

// Read response for the rendered note variants
#[derive(Serialize)]
pub struct NoteView {
    pub name: String,
    pub note: String,
    pub render: &'static str, // which client-side treatment the route implies
}
