use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::dto::scheduling_dto::{InviteViewResponse, ScheduleRequest, ScheduleResponse};
use crate::error::Result;
use crate::AppState;

/// Public, token-authenticated: what the scheduling page shows before the
/// candidate picks a time.
#[axum::debug_handler]
pub async fn get_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let (candidate, job) = state.interview_service.invite_view(&token).await?;
    Ok(Json(InviteViewResponse {
        candidate_name: candidate.name,
        job_title: job.map(|j| j.title).unwrap_or_default(),
    }))
}

/// Public, token-authenticated: finalize the interview time. The token is
/// consumed on success; re-submission fails with a not-found error.
#[axum::debug_handler]
pub async fn submit_schedule(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let updated = state
        .interview_service
        .schedule_by_token(&token, req.datetime)
        .await?;
    Ok(Json(ScheduleResponse {
        success: true,
        meeting_link: updated.meeting_link.unwrap_or_default(),
        interview_status: updated.interview_status,
    }))
}
