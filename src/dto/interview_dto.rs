use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::{Candidate, InterviewStatus};
use crate::models::match_report::MatchReport;
use crate::models::profile::CandidateProfile;

/// Candidate as exposed to operators. The scheduler token never leaves the
/// service; the scheduling link is delivered to the candidate only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: uuid::Uuid,
    pub org_id: i64,
    pub job_id: i64,
    pub name: String,
    pub email: String,
    pub interview_status: InterviewStatus,
    pub interview_datetime: Option<chrono::DateTime<chrono::Utc>>,
    pub meeting_link: Option<String>,
    pub transcript_url: Option<String>,
    pub report_url: Option<String>,
}

impl From<Candidate> for CandidateView {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            org_id: c.org_id,
            job_id: c.job_id,
            name: c.name,
            email: c.email,
            interview_status: c.interview_status,
            interview_datetime: c.interview_datetime,
            meeting_link: c.meeting_link,
            transcript_url: c.transcript_url,
            report_url: c.report_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub candidate: CandidateView,
    pub profile: CandidateProfile,
    pub report: MatchReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerInterviewResponse {
    pub id: uuid::Uuid,
    pub interview_status: InterviewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CallbackRequest {
    #[validate(url)]
    pub transcript_url: String,
    #[validate(url)]
    pub report_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub id: uuid::Uuid,
    pub interview_status: InterviewStatus,
    pub transcript_url: Option<String>,
    pub report_url: Option<String>,
    pub already_recorded: bool,
}
