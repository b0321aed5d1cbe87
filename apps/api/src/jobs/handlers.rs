//! Axum route handlers for the job catalog.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::search::{get_job_by_id, search_jobs_by_keyword};
use crate::models::job::JobResponse;
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: String,
    pub limit: Option<usize>,
}

/// GET /api/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    let job = get_job_by_id(&job_id, state.store.as_ref()).await?;
    Ok(Json(job))
}

/// GET /api/jobs/search?keyword=&limit=
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let jobs = search_jobs_by_keyword(&params.keyword, limit, state.store.as_ref()).await?;
    Ok(Json(jobs))
}
