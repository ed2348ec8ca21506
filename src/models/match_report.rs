use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of scoring a candidate profile against a job requisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub candidate_id: Option<Uuid>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub match_percentage: u8,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}
