pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/match-cv",
            post(matching::handle_match_cv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // static segment wins over the :job_id capture
        .route("/api/jobs/search", get(jobs::handle_search_jobs))
        .route("/api/jobs/:job_id", get(jobs::handle_get_job))
        .with_state(state)
}
