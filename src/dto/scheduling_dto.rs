use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::InterviewStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteViewResponse {
    pub candidate_name: String,
    pub job_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleRequest {
    pub datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub meeting_link: String,
    pub interview_status: InterviewStatus,
}
