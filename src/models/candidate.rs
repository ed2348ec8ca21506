use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a candidate's interview. Transitions only move forward,
/// except for the administrative cancel path available from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Applied,
    ResumeReviewed,
    InterviewRequested,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Applied => "applied",
            InterviewStatus::ResumeReviewed => "resume_reviewed",
            InterviewStatus::InterviewRequested => "interview_requested",
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "applied" => Some(InterviewStatus::Applied),
            "resume_reviewed" => Some(InterviewStatus::ResumeReviewed),
            "interview_requested" => Some(InterviewStatus::InterviewRequested),
            "scheduled" => Some(InterviewStatus::Scheduled),
            "in_progress" => Some(InterviewStatus::InProgress),
            "completed" => Some(InterviewStatus::Completed),
            "cancelled" => Some(InterviewStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Cancelled)
    }

    /// The forward transition table. Cancel is handled separately since it
    /// applies from every non-terminal state.
    pub fn can_advance_to(&self, next: InterviewStatus) -> bool {
        matches!(
            (self, next),
            (InterviewStatus::Applied, InterviewStatus::ResumeReviewed)
                | (InterviewStatus::ResumeReviewed, InterviewStatus::InterviewRequested)
                // Resend: a pending invitation may be re-issued with a fresh token.
                | (InterviewStatus::InterviewRequested, InterviewStatus::InterviewRequested)
                | (InterviewStatus::InterviewRequested, InterviewStatus::Scheduled)
                | (InterviewStatus::Scheduled, InterviewStatus::InProgress)
                | (InterviewStatus::InProgress, InterviewStatus::Completed)
        )
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown interview status: {0}")]
pub struct ParseStatusError(String);

impl TryFrom<String> for InterviewStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        InterviewStatus::parse(&value).ok_or(ParseStatusError(value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub org_id: i64,
    pub job_id: i64,
    pub name: String,
    pub email: String,
    pub resume_text: Option<String>,
    #[sqlx(try_from = "String")]
    pub interview_status: InterviewStatus,
    pub interview_datetime: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub scheduler_token: Option<String>,
    pub transcript_url: Option<String>,
    pub report_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            InterviewStatus::Applied,
            InterviewStatus::ResumeReviewed,
            InterviewStatus::InterviewRequested,
            InterviewStatus::Scheduled,
            InterviewStatus::InProgress,
            InterviewStatus::Completed,
            InterviewStatus::Cancelled,
        ] {
            assert_eq!(InterviewStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InterviewStatus::parse("hired"), None);
    }

    #[test]
    fn forward_transitions_follow_the_table() {
        use InterviewStatus::*;
        assert!(Applied.can_advance_to(ResumeReviewed));
        assert!(ResumeReviewed.can_advance_to(InterviewRequested));
        assert!(InterviewRequested.can_advance_to(Scheduled));
        assert!(Scheduled.can_advance_to(InProgress));
        assert!(InProgress.can_advance_to(Completed));

        // No skipping, no going backwards.
        assert!(!Applied.can_advance_to(Scheduled));
        assert!(!Scheduled.can_advance_to(Completed));
        assert!(!Completed.can_advance_to(InProgress));
        assert!(!Scheduled.can_advance_to(InterviewRequested));
    }

    #[test]
    fn resend_is_the_only_self_transition() {
        use InterviewStatus::*;
        assert!(InterviewRequested.can_advance_to(InterviewRequested));
        assert!(!Scheduled.can_advance_to(Scheduled));
        assert!(!Applied.can_advance_to(Applied));
    }

    #[test]
    fn terminal_states() {
        assert!(InterviewStatus::Completed.is_terminal());
        assert!(InterviewStatus::Cancelled.is_terminal());
        assert!(!InterviewStatus::InProgress.is_terminal());
    }
}
