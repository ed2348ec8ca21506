use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, InterviewStatus};
use crate::models::job::Job;
use crate::services::notification_service::{
    Notifier, ResultsNotice, ScheduleConfirmation, SchedulingInvite,
};
use crate::store::{InterviewStore, TransitionFields};
use crate::utils::token::generate_scheduler_token;

/// Orchestrates the interview lifecycle. Every status change goes through
/// the store's conditional transition; this service never read-then-writes
/// across separate calls.
#[derive(Clone)]
pub struct InterviewService {
    store: Arc<dyn InterviewStore>,
    notifier: Arc<dyn Notifier>,
}

impl InterviewService {
    pub fn new(store: Arc<dyn InterviewStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Fetch a candidate, enforcing that the operator belongs to the
    /// candidate's organization.
    pub async fn get_authorized(&self, id: Uuid, org_id: i64) -> Result<Candidate> {
        let candidate = self
            .store
            .get_record(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("candidate {} not found", id)))?;
        if candidate.org_id != org_id {
            return Err(Error::Forbidden(
                "Candidate belongs to another organization".into(),
            ));
        }
        Ok(candidate)
    }

    pub async fn get_job_for(&self, candidate: &Candidate) -> Result<Option<Job>> {
        self.store.get_job(candidate.job_id).await
    }

    /// Resume review moves `applied → resume_reviewed`. The analysis side
    /// effect (extraction + matching) is run by the route before this call.
    pub async fn mark_resume_reviewed(&self, id: Uuid, org_id: i64) -> Result<Candidate> {
        self.get_authorized(id, org_id).await?;
        self.store
            .conditional_transition(
                id,
                InterviewStatus::Applied,
                InterviewStatus::ResumeReviewed,
                TransitionFields::none(),
            )
            .await
    }

    /// Issue a one-time scheduler token and move the candidate into the
    /// scheduling flow. Re-triggering a pending invitation rotates the
    /// token, invalidating the previously sent link.
    pub async fn trigger_interview(&self, id: Uuid, org_id: i64) -> Result<Candidate> {
        let candidate = self.get_authorized(id, org_id).await?;
        match candidate.interview_status {
            InterviewStatus::ResumeReviewed | InterviewStatus::InterviewRequested => {}
            other => {
                return Err(Error::Conflict(format!(
                    "cannot request an interview while candidate is {}",
                    other
                )))
            }
        }

        let token = generate_scheduler_token();
        let updated = self
            .store
            .conditional_transition(
                id,
                candidate.interview_status,
                InterviewStatus::InterviewRequested,
                TransitionFields::issued_token(token.clone()),
            )
            .await?;

        let job_title = self
            .get_job_for(&updated)
            .await?
            .map(|j| j.title)
            .unwrap_or_default();
        let config = get_config();
        let invite = SchedulingInvite {
            candidate_id: updated.id,
            candidate_name: updated.name.clone(),
            candidate_email: updated.email.clone(),
            job_title,
            scheduling_link: format!(
                "{}/{}",
                config.scheduling_base_url.trim_end_matches('/'),
                token
            ),
        };
        if let Err(e) = self.notifier.send_scheduling_invite(&invite).await {
            tracing::warn!(candidate_id = %updated.id, error = %e, "Failed to send scheduling invite");
        }

        Ok(updated)
    }

    /// Invite details for the public scheduling page.
    pub async fn invite_view(&self, token: &str) -> Result<(Candidate, Option<Job>)> {
        let candidate = self.store.get_record_by_token(token).await?.ok_or_else(|| {
            Error::NotFound("This scheduling link is invalid or has already been used".into())
        })?;
        if candidate.interview_status != InterviewStatus::InterviewRequested {
            return Err(Error::Conflict(
                "This interview can no longer be scheduled".into(),
            ));
        }
        let job = self.store.get_job(candidate.job_id).await?;
        Ok((candidate, job))
    }

    /// Token-authenticated scheduling: sets datetime and meeting link in
    /// one transition and consumes the token.
    pub async fn schedule_by_token(
        &self,
        token: &str,
        datetime: DateTime<Utc>,
    ) -> Result<Candidate> {
        let candidate = self.store.get_record_by_token(token).await?.ok_or_else(|| {
            Error::NotFound("This scheduling link is invalid or has already been used".into())
        })?;
        if candidate.interview_status != InterviewStatus::InterviewRequested {
            return Err(Error::Conflict(
                "This interview can no longer be scheduled".into(),
            ));
        }
        if datetime <= Utc::now() {
            return Err(Error::Validation(
                "The interview time must be in the future".into(),
            ));
        }

        let config = get_config();
        let meeting_link = format!(
            "{}/{}",
            config.meeting_base_url.trim_end_matches('/'),
            Uuid::new_v4()
        );
        let updated = self
            .store
            .conditional_transition(
                candidate.id,
                InterviewStatus::InterviewRequested,
                InterviewStatus::Scheduled,
                TransitionFields::scheduled(datetime, meeting_link),
            )
            .await?;

        let confirmation = ScheduleConfirmation {
            candidate_id: updated.id,
            candidate_name: updated.name.clone(),
            interview_datetime: datetime,
            meeting_link: updated.meeting_link.clone().unwrap_or_default(),
        };
        if let Err(e) = self.notifier.send_schedule_confirmation(&confirmation).await {
            tracing::warn!(candidate_id = %updated.id, error = %e, "Failed to send schedule confirmation");
        }

        Ok(updated)
    }

    /// Result ingestion from the agent callback. Returns the record plus a
    /// flag telling whether results were already recorded; a repeat call on
    /// a completed record is a no-op and sends no second notification.
    pub async fn complete_interview(
        &self,
        id: Uuid,
        transcript_url: String,
        report_url: String,
    ) -> Result<(Candidate, bool)> {
        let candidate = self
            .store
            .get_record(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("candidate {} not found", id)))?;

        match candidate.interview_status {
            InterviewStatus::Completed => Ok((candidate, true)),
            InterviewStatus::InProgress => {
                let updated = self
                    .store
                    .conditional_transition(
                        id,
                        InterviewStatus::InProgress,
                        InterviewStatus::Completed,
                        TransitionFields::results(transcript_url.clone(), report_url.clone()),
                    )
                    .await?;

                let notice = ResultsNotice {
                    candidate_id: updated.id,
                    candidate_name: updated.name.clone(),
                    transcript_url,
                    report_url,
                };
                if let Err(e) = self.notifier.send_results_notice(&notice).await {
                    tracing::warn!(candidate_id = %updated.id, error = %e, "Failed to send results notice");
                }

                Ok((updated, false))
            }
            other => Err(Error::Conflict(format!(
                "cannot record results while candidate is {}",
                other
            ))),
        }
    }

    /// Administrative cancel, allowed from any non-terminal state.
    pub async fn cancel(&self, id: Uuid, org_id: i64) -> Result<Candidate> {
        let candidate = self.get_authorized(id, org_id).await?;
        if candidate.interview_status.is_terminal() {
            return Err(Error::Conflict(format!(
                "candidate is already {}",
                candidate.interview_status
            )));
        }
        self.store
            .conditional_transition(
                id,
                candidate.interview_status,
                InterviewStatus::Cancelled,
                TransitionFields::none(),
            )
            .await
    }
}
