use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::models::match_report::MatchReport;
use crate::models::profile::CandidateProfile;
use crate::models::question_set::QuestionSet;

pub mod ai;
pub mod heuristic;

pub use ai::AiEngine;
pub use heuristic::HeuristicEngine;

/// One capability, two implementations: the AI backend and the
/// deterministic heuristics. Callers go through [`AnalysisService`] and
/// never learn which one ran.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    async fn extract_profile(&self, resume_text: &str) -> Result<CandidateProfile>;

    async fn score_match(&self, profile: &CandidateProfile, job: &Job) -> Result<MatchReport>;
}

#[derive(Clone)]
pub struct AnalysisService {
    primary: Option<AiEngine>,
    fallback: HeuristicEngine,
}

impl AnalysisService {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self {
            primary: api_key.map(|key| AiEngine::new(key, client)),
            fallback: HeuristicEngine::new(),
        }
    }

    /// Heuristics only; used when no AI key is configured and in tests.
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: HeuristicEngine::new(),
        }
    }

    pub async fn extract_profile(&self, resume_text: &str) -> Result<CandidateProfile> {
        if let Some(ai) = &self.primary {
            match ai.extract_profile(resume_text).await {
                Ok(profile) => return Ok(profile),
                Err(e) => {
                    tracing::warn!(error = %e, "AI extraction failed, using heuristic fallback")
                }
            }
        }
        self.fallback.extract_profile(resume_text).await
    }

    pub async fn score_match(
        &self,
        profile: &CandidateProfile,
        job: &Job,
    ) -> Result<MatchReport> {
        if let Some(ai) = &self.primary {
            match ai.score_match(profile, job).await {
                Ok(report) => return Ok(report),
                Err(e) => {
                    tracing::warn!(error = %e, "AI match scoring failed, using heuristic fallback")
                }
            }
        }
        self.fallback.score_match(profile, job).await
    }

    /// Extraction followed by scoring, as run during resume review.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job: &Job,
    ) -> Result<(CandidateProfile, MatchReport)> {
        let profile = self.extract_profile(resume_text).await?;
        let report = self.score_match(&profile, job).await?;
        Ok((profile, report))
    }

    /// Question generation has no deterministic fallback; an unavailable
    /// backend surfaces as `Upstream` so the caller can tell it apart from
    /// other failures.
    pub async fn generate_questions(
        &self,
        profile: &CandidateProfile,
        job: &Job,
    ) -> Result<QuestionSet> {
        match &self.primary {
            Some(ai) => ai.generate_questions(profile, job).await,
            None => Err(Error::Upstream(
                "Question generation requires the AI backend, which is not configured".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job() -> Job {
        Job {
            id: 1,
            org_id: 1,
            title: "Platform Engineer".into(),
            description: "Keep the lights on".into(),
            required_skills: vec!["Rust".into()],
            created_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn extraction_works_without_an_ai_key() {
        let service = AnalysisService::heuristic_only();
        let profile = service
            .extract_profile("John Doe\njohn@example.com\nRust for 4 years")
            .await
            .unwrap();
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.email, "john@example.com");
    }

    #[tokio::test]
    async fn scoring_works_without_an_ai_key() {
        let service = AnalysisService::heuristic_only();
        let profile = service
            .extract_profile("John Doe\nRust developer, 4 years")
            .await
            .unwrap();
        let report = service.score_match(&profile, &job()).await.unwrap();
        assert!(report.match_percentage > 0);
    }

    #[tokio::test]
    async fn question_generation_surfaces_missing_backend() {
        let service = AnalysisService::heuristic_only();
        let profile = service.extract_profile("John Doe").await.unwrap();
        let err = service.generate_questions(&profile, &job()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
