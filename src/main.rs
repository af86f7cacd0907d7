mod config;
mod db;
mod error;
mod handlers;
mod metrics;
mod middleware;
mod models;
mod notes;
mod rate_limit;
mod state;
mod visits;

use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::Args;
use crate::db::Database;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let db = Database::open(&args.db_path).expect("failed to open note database");
    let state = Arc::new(AppState {
        db,
        write_interval: args.write_interval,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind port");

    info!("notehost listening on http://{}", addr);
    info!("database file: {}", args.db_path);
    info!("write interval: {}s per client IP", args.write_interval);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/note/{name}", get(handlers::view_note))
        .route("/raw/{name}", get(handlers::raw_note))
        .route("/raw/note/{name}", get(handlers::raw_note))
        .route("/code/{name}", get(handlers::code_note))
        .route("/code/note/{name}", get(handlers::code_note))
        .route("/texdown/{name}", get(handlers::texdown_note))
        .route("/texdown/note/{name}", get(handlers::texdown_note))
        .route("/save/note/{name}", post(handlers::save_note))
        .route("/save/note/{name}/{key}", post(handlers::save_note_with_key))
        .route("/delete/note/{name}", get(handlers::delete_note))
        .route("/delete/note/{name}/{key}", get(handlers::delete_note_with_key))
        .route("/stats", get(handlers::stats_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_visits,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(write_interval: i64) -> Router {
        let db = Database::open_in_memory().expect("in-memory database");
        let state = Arc::new(AppState { db, write_interval });
        router(state)
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let res = app.clone().oneshot(req).await.expect("request failed");
        let status = res.status();
        let bytes = res.into_body().collect().await.expect("body").to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn save_json(name: &str, key: Option<&str>, ip: &str, note: &str) -> Request<Body> {
        let uri = match key {
            Some(k) => format!("/save/note/{name}/{k}"),
            None => format!("/save/note/{name}"),
        };
        let body = serde_json::json!({ "note": note }).to_string();
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(body))
            .unwrap()
    }

    fn get_as(uri: &str, ip: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn save_then_read_back_raw() {
        let app = app(10);

        let (status, body) = call(&app, save_json("greeting", None, "10.0.0.1", "hello there")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Success! Note \"greeting\" saved\n");

        let (status, body) = call(&app, get_as("/raw/greeting", "10.0.0.2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello there");

        // the longer raw route reads the same note
        let (_, body) = call(&app, get_as("/raw/note/greeting", "10.0.0.2")).await;
        assert_eq!(body, "hello there");
    }

    #[tokio::test]
    async fn read_variants_tag_their_render_mode() {
        let app = app(10);
        call(&app, save_json("shape", None, "10.0.0.1", "content")).await;

        for (uri, render) in [
            ("/note/shape", "plain"),
            ("/code/shape", "code"),
            ("/texdown/shape", "texdown"),
        ] {
            let (status, body) = call(&app, get_as(uri, "10.0.0.2")).await;
            assert_eq!(status, StatusCode::OK);
            let v: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(v["name"], "shape");
            assert_eq!(v["note"], "content");
            assert_eq!(v["render"], render);
        }
    }

    #[tokio::test]
    async fn missing_note_reads_as_empty() {
        let app = app(10);
        let (status, body) = call(&app, get_as("/raw/not-there", "10.0.0.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn form_body_is_accepted() {
        let app = app(10);

        let req = Request::builder()
            .method("POST")
            .uri("/save/note/form-note")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "10.0.0.3")
            .body(Body::from("note=from+a+form"))
            .unwrap();
        let (status, _) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, get_as("/raw/form-note", "10.0.0.3")).await;
        assert_eq!(body, "from a form");
    }

    #[tokio::test]
    async fn second_write_within_interval_is_rejected() {
        let app = app(10);

        let (status, _) = call(&app, save_json("pace", None, "10.0.1.1", "one")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, save_json("pace", None, "10.0.1.1", "two")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Rate limit"));

        // the rejected write did not land
        let (_, body) = call(&app, get_as("/raw/pace", "10.0.1.9")).await;
        assert_eq!(body, "one");
    }

    #[tokio::test]
    async fn distinct_ips_are_paced_independently() {
        let app = app(10);
        let (status, _) = call(&app, save_json("a", None, "10.0.2.1", "x")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, save_json("b", None, "10.0.2.2", "y")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_key_is_forbidden() {
        let app = app(0);

        let (status, _) = call(&app, save_json("locked", Some("s3cret"), "10.0.3.1", "mine")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, save_json("locked", Some("other"), "10.0.3.2", "theirs")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Note already saved with different key\n");

        // omitting the key counts as the empty key, which also mismatches
        let (status, _) = call(&app, save_json("locked", None, "10.0.3.2", "theirs")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = call(&app, get_as("/raw/locked", "10.0.3.3")).await;
        assert_eq!(body, "mine");
    }

    #[tokio::test]
    async fn matching_key_updates_note() {
        let app = app(0);
        call(&app, save_json("diary", Some("k"), "10.0.4.1", "day one")).await;

        let (status, _) = call(&app, save_json("diary", Some("k"), "10.0.4.1", "day two")).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, get_as("/raw/diary", "10.0.4.1")).await;
        assert_eq!(body, "day two");
    }

    #[tokio::test]
    async fn oversized_name_is_rejected() {
        let app = app(10);
        let name = "x".repeat(100);
        let (status, body) = call(&app, save_json(&name, None, "10.0.5.1", "content")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Note name length must be between 1 and 100 characters\n");
    }

    #[tokio::test]
    async fn delete_flow() {
        let app = app(0);
        call(&app, save_json("gone", Some("k"), "10.0.6.1", "soon gone")).await;

        let (status, body) = call(&app, get_as("/delete/note/gone/wrong", "10.0.6.2")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Incorrect key\n");

        let (status, body) = call(&app, get_as("/delete/note/gone/k", "10.0.6.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Success! Note \"gone\" deleted\n");

        let (_, body) = call(&app, get_as("/raw/gone", "10.0.6.1")).await;
        assert_eq!(body, "");

        // deleting a note that never existed still succeeds
        let (status, _) = call(&app, get_as("/delete/note/never", "10.0.6.1")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn index_reports_note_count() {
        let app = app(0);
        call(&app, save_json("one", None, "10.0.7.1", "x")).await;
        call(&app, save_json("two", None, "10.0.7.2", "y")).await;

        let (status, body) = call(&app, get_as("/", "10.0.7.3")).await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["notes"], 2);
    }

    #[tokio::test]
    async fn stats_reports_counts_and_hides_save_paths() {
        let app = app(0);
        call(&app, save_json("a", None, "10.1.0.1", "x")).await;
        call(&app, save_json("b", None, "10.1.0.2", "y")).await;
        for ip in ["10.1.0.1", "10.1.0.2", "10.1.0.3"] {
            call(&app, get_as("/note/a", ip)).await;
        }

        let (status, body) = call(&app, get_as("/stats", "10.1.0.9")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Visitors: "));
        assert!(body.contains("Notes: 2\n"));
        assert!(body.contains("Authors: 2\n"));
        assert!(body.contains("/note/a\t3\n"));
        assert!(!body.contains("/save/"));
    }

    #[tokio::test]
    async fn rejected_requests_still_count_as_visits() {
        let app = app(10);
        call(&app, save_json("seen", None, "10.2.0.1", "x")).await;
        // rejected by the rate gate, but the visit is recorded first
        call(&app, save_json("seen", None, "10.2.0.1", "y")).await;

        let (_, body) = call(&app, get_as("/stats", "10.2.0.2")).await;
        // both the writer and the stats caller show up as visitors
        assert!(body.contains("Visitors: 2\n"));
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let app = app(10);

        let (status, body) = call(&app, get_as("/health", "10.3.0.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("healthy"));

        let (status, body) = call(&app, get_as("/metrics", "10.3.0.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("notehost_requests_total"));
    }
}
