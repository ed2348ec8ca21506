use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, InterviewStatus};
use crate::models::job::Job;

use super::{InterviewStore, TransitionFields};

/// In-memory store with the same compare-and-set contract as the Postgres
/// implementation. Backs the test suite and local experimentation; the
/// status check and the write happen under one lock, mirroring the
/// single-statement UPDATE on the database side.
#[derive(Default)]
pub struct MemoryInterviewStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    candidates: HashMap<Uuid, Candidate>,
    jobs: HashMap<i64, Job>,
}

impl MemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_candidate(&self, candidate: Candidate) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.candidates.insert(candidate.id, candidate);
    }

    pub fn insert_job(&self, job: Job) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.jobs.insert(job.id, job);
    }
}

#[async_trait]
impl InterviewStore for MemoryInterviewStore {
    async fn get_record(&self, id: Uuid) -> Result<Option<Candidate>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.candidates.get(&id).cloned())
    }

    async fn get_record_by_token(&self, token: &str) -> Result<Option<Candidate>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .candidates
            .values()
            .find(|c| c.scheduler_token.as_deref() == Some(token))
            .cloned())
    }

    async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.jobs.get(&id).cloned())
    }

    async fn list_ready(&self, now: DateTime<Utc>) -> Result<Vec<Candidate>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut ready: Vec<Candidate> = inner
            .candidates
            .values()
            .filter(|c| {
                c.interview_status == InterviewStatus::Scheduled
                    && c.interview_datetime.is_some_and(|dt| dt <= now)
            })
            .cloned()
            .collect();
        ready.sort_by_key(|c| c.interview_datetime);
        Ok(ready)
    }

    async fn list_stuck(&self, cutoff: DateTime<Utc>) -> Result<Vec<Candidate>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut stuck: Vec<Candidate> = inner
            .candidates
            .values()
            .filter(|c| {
                c.interview_status == InterviewStatus::InProgress
                    && c.updated_at.is_some_and(|at| at <= cutoff)
            })
            .cloned()
            .collect();
        stuck.sort_by_key(|c| c.updated_at);
        Ok(stuck)
    }

    async fn conditional_transition(
        &self,
        id: Uuid,
        expected: InterviewStatus,
        next: InterviewStatus,
        fields: TransitionFields,
    ) -> Result<Candidate> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");

        if let Some(ref token) = fields.scheduler_token {
            // Active tokens are unique; the database enforces this with a
            // partial unique index.
            let taken = inner
                .candidates
                .values()
                .any(|c| c.id != id && c.scheduler_token.as_deref() == Some(token));
            if taken {
                return Err(Error::Conflict("scheduler token already active".into()));
            }
        }

        let candidate = inner
            .candidates
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("candidate {} not found", id)))?;

        if candidate.interview_status != expected {
            return Err(Error::Conflict(format!(
                "candidate {} is {}, expected {}",
                id, candidate.interview_status, expected
            )));
        }

        candidate.interview_status = next;
        if fields.clear_scheduler_token {
            candidate.scheduler_token = None;
        } else if let Some(token) = fields.scheduler_token {
            candidate.scheduler_token = Some(token);
        }
        if let Some(datetime) = fields.interview_datetime {
            candidate.interview_datetime = Some(datetime);
        }
        if let Some(link) = fields.meeting_link {
            candidate.meeting_link = Some(link);
        }
        if let Some(transcript) = fields.transcript_url {
            candidate.transcript_url = Some(transcript);
        }
        if let Some(report) = fields.report_url {
            candidate.report_url = Some(report);
        }
        candidate.updated_at = Some(Utc::now());

        Ok(candidate.clone())
    }
}
