use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Hand-off payload for the external interview agent.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DispatchRequest {
    pub candidate_id: Uuid,
    pub meeting_link: String,
}

/// The external service that conducts the interview and reports back via
/// the machine callback surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterviewAgent: Send + Sync {
    async fn dispatch_interview(&self, request: &DispatchRequest) -> Result<()>;
}

#[derive(Clone)]
pub struct HttpInterviewAgent {
    client: Client,
    base_url: String,
    secret: String,
    timeout: Duration,
}

impl HttpInterviewAgent {
    pub fn new(base_url: String, secret: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            base_url,
            secret,
            timeout,
        }
    }
}

#[async_trait]
impl InterviewAgent for HttpInterviewAgent {
    async fn dispatch_interview(&self, request: &DispatchRequest) -> Result<()> {
        let url = format!("{}/interviews", self.base_url.trim_end_matches('/'));
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Agent dispatch failed: {}", e)))?;

        if !res.status().is_success() {
            return Err(Error::Upstream(format!(
                "Agent rejected dispatch with {}",
                res.status()
            )));
        }
        Ok(())
    }
}
