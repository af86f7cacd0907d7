use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::error;

use crate::metrics::REQUEST_TOTAL;
use crate::state::AppState;
use crate::visits;

// Resolved client address, stashed in request extensions for the handlers
#[derive(Clone)]
pub struct ClientIp(pub String);

// First X-Forwarded-For value wins, else the socket peer address. The
// header is trivially spoofable; attribution here is best-effort only.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// Runs before every handler: count the request, record the (ip, path)
// visit, and hand the resolved IP to whichever handler comes next. Visits
// are recorded even for requests that will later be rejected.
pub async fn track_visits(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let ip = client_ip(req.headers(), req.extensions());
    let path = req.uri().path().to_string();

    // a storage fault here must not fail the request itself
    if let Err(e) = visits::record(&state.db, &ip, &path) {
        error!("visit tracking failed for {path}: {e}");
    }

    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}
