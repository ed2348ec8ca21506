use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{Candidate, InterviewStatus};
use crate::models::job::Job;

pub mod memory;
pub mod postgres;

pub use memory::MemoryInterviewStore;
pub use postgres::PgInterviewStore;

/// Fields written alongside a status transition. Each transition writes its
/// own subset; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub scheduler_token: Option<String>,
    pub clear_scheduler_token: bool,
    pub interview_datetime: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
    pub transcript_url: Option<String>,
    pub report_url: Option<String>,
}

impl TransitionFields {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn issued_token(token: String) -> Self {
        Self {
            scheduler_token: Some(token),
            ..Self::default()
        }
    }

    /// Scheduling sets the datetime and meeting link together and consumes
    /// the token in the same write.
    pub fn scheduled(datetime: DateTime<Utc>, meeting_link: String) -> Self {
        Self {
            clear_scheduler_token: true,
            interview_datetime: Some(datetime),
            meeting_link: Some(meeting_link),
            ..Self::default()
        }
    }

    pub fn results(transcript_url: String, report_url: String) -> Self {
        Self {
            transcript_url: Some(transcript_url),
            report_url: Some(report_url),
            ..Self::default()
        }
    }
}

/// The interview state store. All status changes go through
/// `conditional_transition`, which writes only if the record is still in
/// `expected` status — the single concurrency discipline of this service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get_record(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn get_record_by_token(&self, token: &str) -> Result<Option<Candidate>>;

    async fn get_job(&self, id: i64) -> Result<Option<Job>>;

    /// Records ready for dispatch: status `scheduled` with a datetime at or
    /// before `now`.
    async fn list_ready(&self, now: DateTime<Utc>) -> Result<Vec<Candidate>>;

    /// Records claimed but never completed: status `in_progress` last
    /// touched at or before `cutoff`.
    async fn list_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Candidate>>;

    /// Compare-and-set transition. Fails with `Conflict` if the record is no
    /// longer in `expected` status, `NotFound` if it does not exist; never
    /// silently overwrites.
    async fn conditional_transition(
        &self,
        id: Uuid,
        expected: InterviewStatus,
        next: InterviewStatus,
        fields: TransitionFields,
    ) -> Result<Candidate>;
}
