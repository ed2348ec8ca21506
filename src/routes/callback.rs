use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::interview_dto::{CallbackRequest, CallbackResponse};
use crate::error::Result;
use crate::AppState;

/// Machine callback from the interview agent. Authenticated by the
/// `X-Agent-Secret` middleware on this route group; repeat deliveries are
/// answered with the stored record, not an error, because the agent
/// retries on network failures.
#[axum::debug_handler]
pub async fn complete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CallbackRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let (candidate, already_recorded) = state
        .interview_service
        .complete_interview(id, req.transcript_url, req.report_url)
        .await?;
    Ok(Json(CallbackResponse {
        id: candidate.id,
        interview_status: candidate.interview_status,
        transcript_url: candidate.transcript_url,
        report_url: candidate.report_url,
        already_recorded,
    }))
}
