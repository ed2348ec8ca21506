use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, InterviewStatus};
use crate::models::job::Job;

use super::{InterviewStore, TransitionFields};

const CANDIDATE_COLUMNS: &str = "id, org_id, job_id, name, email, resume_text, \
     interview_status, interview_datetime, meeting_link, scheduler_token, \
     transcript_url, report_url, created_at, updated_at";

#[derive(Clone)]
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn get_record(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates WHERE id = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn get_record_by_token(&self, token: &str) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates WHERE scheduler_token = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT id, org_id, title, description, required_skills, created_at \
             FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn list_ready(&self, now: DateTime<Utc>) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates \
             WHERE interview_status = 'scheduled' AND interview_datetime <= $1 \
             ORDER BY interview_datetime ASC",
            CANDIDATE_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn list_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates \
             WHERE interview_status = 'in_progress' AND updated_at <= $1 \
             ORDER BY updated_at ASC",
            CANDIDATE_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn conditional_transition(
        &self,
        id: Uuid,
        expected: InterviewStatus,
        next: InterviewStatus,
        fields: TransitionFields,
    ) -> Result<Candidate> {
        // Single conditional UPDATE: the status guard lives in the WHERE
        // clause, so a concurrent writer makes this affect zero rows instead
        // of clobbering their transition.
        let updated = sqlx::query_as::<_, Candidate>(&format!(
            "UPDATE candidates SET \
                interview_status = $3, \
                scheduler_token = CASE WHEN $4 THEN NULL ELSE COALESCE($5, scheduler_token) END, \
                interview_datetime = COALESCE($6, interview_datetime), \
                meeting_link = COALESCE($7, meeting_link), \
                transcript_url = COALESCE($8, transcript_url), \
                report_url = COALESCE($9, report_url), \
                updated_at = NOW() \
             WHERE id = $1 AND interview_status = $2 \
             RETURNING {}",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(fields.clear_scheduler_token)
        .bind(fields.scheduler_token)
        .bind(fields.interview_datetime)
        .bind(fields.meeting_link)
        .bind(fields.transcript_url)
        .bind(fields.report_url)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(candidate) => Ok(candidate),
            None => {
                // Distinguish a missing record from a lost race.
                match self.get_record(id).await? {
                    Some(current) => Err(Error::Conflict(format!(
                        "candidate {} is {}, expected {}",
                        id, current.interview_status, expected
                    ))),
                    None => Err(Error::NotFound(format!("candidate {} not found", id))),
                }
            }
        }
    }
}
