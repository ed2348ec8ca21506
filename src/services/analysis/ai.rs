use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::job::Job;
use crate::models::match_report::MatchReport;
use crate::models::profile::CandidateProfile;
use crate::models::question_set::QuestionSet;

use super::AnalysisEngine;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const AI_TIMEOUT: Duration = Duration::from_secs(30);

/// AI-backed analysis via an OpenAI-compatible chat completion endpoint.
/// Every request demands a JSON object response; anything malformed is
/// reported as an upstream failure so the caller can fall back.
#[derive(Clone)]
pub struct AiEngine {
    client: Client,
    api_key: String,
}

impl AiEngine {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }

    pub async fn generate_questions(
        &self,
        profile: &CandidateProfile,
        job: &Job,
    ) -> Result<QuestionSet> {
        let system_prompt = "You are a Senior Technical Recruiter preparing an interview plan. \
            Return a JSON object with three arrays of question strings: \
            'technical', 'behavioral' and 'job_specific'. \
            Each array must contain between 3 and 6 questions tailored to the \
            candidate and the vacancy. No commentary outside the JSON.";

        let user_data = serde_json::json!({
            "candidate": {
                "name": profile.name,
                "skills": profile.skills,
                "total_experience": profile.total_experience,
                "summary": profile.summary,
            },
            "job": {
                "title": job.title,
                "description": job.description,
                "required_skills": job.required_skills,
            },
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_data.to_string()}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7
        });

        let resp = self.chat_completion(payload).await?;
        let questions: QuestionSet = serde_json::from_value(resp)
            .map_err(|e| Error::Upstream(format!("Malformed question payload: {}", e)))?;
        if !questions.is_complete() {
            return Err(Error::Upstream(
                "AI returned an incomplete question set".into(),
            ));
        }
        Ok(questions)
    }

    async fn chat_completion(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(AI_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("AI backend unreachable: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "AI backend error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("AI backend returned invalid JSON: {}", e)))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| Error::Upstream("Invalid AI response format".into()))
    }
}

#[async_trait]
impl AnalysisEngine for AiEngine {
    async fn extract_profile(&self, resume_text: &str) -> Result<CandidateProfile> {
        let system_prompt = "You are an expert resume parser. Extract a structured profile \
            from the resume text and return a JSON object with exactly these fields: \
            'name', 'email', 'links' (array of URLs), 'skills' (deduplicated array), \
            'experience' (array of {company, position, duration, start_year, end_year, description}), \
            'total_experience' (short summary string) and 'summary'. \
            Use empty arrays and short placeholder strings for anything absent.";

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": resume_text}
            ],
            "response_format": { "type": "json_object" }
        });

        let resp = self.chat_completion(payload).await?;
        let profile: CandidateProfile = serde_json::from_value(resp)
            .map_err(|e| Error::Upstream(format!("Malformed profile payload: {}", e)))?;
        Ok(profile)
    }

    async fn score_match(&self, profile: &CandidateProfile, job: &Job) -> Result<MatchReport> {
        let system_prompt = "You are an unbiased senior recruiter. Evaluate how well the \
            candidate profile matches the vacancy. Return a JSON object with \
            'match_percentage' (integer 0-100), 'strengths' (array of short statements) \
            and 'gaps' (array of short statements). Be strict: missing mandatory \
            requirements must lower the percentage substantially.";

        let user_data = serde_json::json!({
            "candidate": profile,
            "job": {
                "title": job.title,
                "description": job.description,
                "required_skills": job.required_skills,
            },
        });

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_data.to_string()}
            ],
            "response_format": { "type": "json_object" }
        });

        let resp = self.chat_completion(payload).await?;

        #[derive(serde::Deserialize)]
        struct RawScore {
            match_percentage: i64,
            #[serde(default)]
            strengths: Vec<String>,
            #[serde(default)]
            gaps: Vec<String>,
        }

        let raw: RawScore = serde_json::from_value(resp)
            .map_err(|e| Error::Upstream(format!("Malformed match payload: {}", e)))?;

        Ok(MatchReport {
            candidate_id: None,
            candidate_name: profile.name.clone(),
            candidate_email: profile.email.clone(),
            match_percentage: raw.match_percentage.clamp(0, 100) as u8,
            strengths: raw.strengths,
            gaps: raw.gaps,
        })
    }
}
