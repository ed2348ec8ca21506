use axum::{extract::State, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::dto::analysis_dto::{ExtractRequest, MatchRequest, QuestionsRequest};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn extract_profile(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let profile = state.analysis_service.extract_profile(&req.resume_text).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn match_candidate(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let job = state
        .store
        .get_job(req.job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("job {} not found", req.job_id)))?;
    let (_, report) = state.analysis_service.analyze(&req.resume_text, &job).await?;
    Ok(Json(report))
}

/// Interview question preparation for a reviewed candidate. Unlike
/// extraction and matching this has no deterministic fallback; an
/// unavailable AI backend surfaces as a 502.
#[axum::debug_handler]
pub async fn generate_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<QuestionsRequest>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .interview_service
        .get_authorized(req.candidate_id, claims.org_id)
        .await?;
    let job = state
        .interview_service
        .get_job_for(&candidate)
        .await?
        .ok_or_else(|| Error::NotFound(format!("job {} not found", candidate.job_id)))?;

    let resume_text = candidate.resume_text.clone().unwrap_or_default();
    let profile = state.analysis_service.extract_profile(&resume_text).await?;
    let questions = state.analysis_service.generate_questions(&profile, &job).await?;
    Ok(Json(questions))
}
