//! Axum route handler for CV matching.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::QueryRejection,
        Multipart, Query, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::cv::extract::{extract_text, UploadedCv};
use crate::errors::AppError;
use crate::matching::matcher::{find_matches, MatchRequest};
use crate::models::job::JobResponse;
use crate::state::AppState;

/// Optional inputs may also arrive on the query string; form fields win.
#[derive(Debug, Default, Deserialize)]
pub struct MatchParams {
    pub interests: Option<String>,
    pub soft_skills: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
struct MatchForm {
    cv_file: Option<UploadedCv>,
    interests: Option<String>,
    soft_skills: Option<String>,
    limit: Option<usize>,
}

async fn read_form(mut multipart: Multipart) -> Result<MatchForm, AppError> {
    let mut form = MatchForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv_file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                form.cv_file = Some(UploadedCv {
                    filename,
                    content_type,
                    data,
                });
            }
            "interests" => form.interests = Some(field_text(field).await?),
            "soft_skills" => form.soft_skills = Some(field_text(field).await?),
            "limit" => {
                let raw = field_text(field).await?;
                let limit = raw.trim().parse::<usize>().map_err(|_| {
                    AppError::Validation(format!("limit must be a positive integer, got '{raw}'"))
                })?;
                form.limit = Some(limit);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    Ok(field.text().await?)
}

/// POST /api/match-cv
///
/// Multipart form: `cv_file` (PDF, Markdown or text) plus optional `interests`,
/// `soft_skills` and `limit`. Returns postings ranked by embedding similarity.
pub async fn handle_match_cv(
    State(state): State<AppState>,
    params: Result<Query<MatchParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    let Query(params) = params?;
    let multipart = multipart?;
    let request_id = Uuid::new_v4();
    match_cv(state, params, multipart)
        .instrument(info_span!("match_cv", %request_id))
        .await
}

async fn match_cv(
    state: AppState,
    params: MatchParams,
    multipart: Multipart,
) -> Result<Json<Vec<JobResponse>>, AppError> {
    let form = read_form(multipart).await?;

    let upload = form
        .cv_file
        .ok_or_else(|| AppError::Validation("cv_file is required".to_string()))?;
    let interests = form.interests.or(params.interests);
    let soft_skills = form.soft_skills.or(params.soft_skills);
    let limit = form
        .limit
        .or(params.limit)
        .unwrap_or(state.config.match_limit);
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let cv_text = extract_text(upload).await?;
    let cv_content = state.summarizer.summarize(&cv_text).await?;

    let matches = find_matches(
        state.store.as_ref(),
        state.embedder.as_ref(),
        MatchRequest {
            cv_text: &cv_content,
            interests: interests.as_deref(),
            soft_skills: soft_skills.as_deref(),
            limit,
        },
    )
    .await?;

    info!("Returning {} matches", matches.len());
    Ok(Json(matches.into_iter().map(JobResponse::from).collect()))
}
