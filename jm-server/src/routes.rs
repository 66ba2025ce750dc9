//! Web routes for the scheduler-facing entry point.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use libjeanmichel::{poster, Config, RunOutcome};

/// Header set by the App Engine cron service on legitimate scheduler
/// requests; external traffic cannot forge it past the frontend.
const SCHEDULER_HEADER: &str = "x-appengine-cron";

const PROTECTED_BODY: &str = "This URL is protected.";

/// Shared state for the web server.
pub struct AppState {
    pub config: Arc<Config>,
}

/// Create the web router.
pub fn create_router(config: Arc<Config>) -> Router {
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/tweet", get(tweet))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Whether the request carries the scheduler identity header.
///
/// Pure check over the header map; callers reject the request before
/// touching storage or the posting API when this returns false.
pub fn is_scheduler_request(headers: &HeaderMap) -> bool {
    headers.contains_key(SCHEDULER_HEADER)
}

async fn tweet(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !is_scheduler_request(&headers) {
        return (StatusCode::UNAUTHORIZED, PROTECTED_BODY).into_response();
    }

    match poster::run_once(&state.config).await {
        Ok(RunOutcome::Posted { index, post_id, .. }) => {
            info!("run complete: posted entry {} as {}", index, post_id);
            (StatusCode::OK, "Success").into_response()
        }
        Ok(RunOutcome::Exhausted { .. }) => {
            // Already logged as a warning by the poster; an empty run is
            // still a successful run.
            (StatusCode::OK, "Success").into_response()
        }
        Err(e) => {
            error!("run failed: {}", e);
            (StatusCode::BAD_REQUEST, "Failed").into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
