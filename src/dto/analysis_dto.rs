use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractRequest {
    #[validate(length(min = 1, message = "resume_text must not be empty"))]
    pub resume_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1, message = "resume_text must not be empty"))]
    pub resume_text: String,
    pub job_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsRequest {
    pub candidate_id: uuid::Uuid,
}
