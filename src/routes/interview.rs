use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::dto::interview_dto::{CandidateView, ReviewResponse, TriggerInterviewResponse};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .interview_service
        .get_authorized(id, claims.org_id)
        .await?;
    Ok(Json(CandidateView::from(candidate)))
}

/// Resume review: run extraction and matching over the stored resume text,
/// then advance the candidate to `resume_reviewed`.
#[axum::debug_handler]
pub async fn review_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .interview_service
        .get_authorized(id, claims.org_id)
        .await?;
    let job = state
        .interview_service
        .get_job_for(&candidate)
        .await?
        .ok_or_else(|| {
            crate::error::Error::NotFound(format!("job {} not found", candidate.job_id))
        })?;

    let resume_text = candidate.resume_text.clone().unwrap_or_default();
    let (profile, mut report) = state.analysis_service.analyze(&resume_text, &job).await?;
    report.candidate_id = Some(candidate.id);

    let updated = state
        .interview_service
        .mark_resume_reviewed(id, claims.org_id)
        .await?;

    Ok(Json(ReviewResponse {
        candidate: CandidateView::from(updated),
        profile,
        report,
    }))
}

#[axum::debug_handler]
pub async fn trigger_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let updated = state
        .interview_service
        .trigger_interview(id, claims.org_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(TriggerInterviewResponse {
            id: updated.id,
            interview_status: updated.interview_status,
        }),
    ))
}

#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let updated = state.interview_service.cancel(id, claims.org_id).await?;
    Ok(Json(TriggerInterviewResponse {
        id: updated.id,
        interview_status: updated.interview_status,
    }))
}
