use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde_json::Value as JsonValue;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SchedulingInvite {
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_title: String,
    pub scheduling_link: String,
}

#[derive(Debug, Clone)]
pub struct ScheduleConfirmation {
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub interview_datetime: chrono::DateTime<chrono::Utc>,
    pub meeting_link: String,
}

#[derive(Debug, Clone)]
pub struct ResultsNotice {
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub transcript_url: String,
    pub report_url: String,
}

/// Outbound notifications. Fire-and-forget from the pipeline's point of
/// view: callers log failures and move on, they never propagate them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_scheduling_invite(&self, invite: &SchedulingInvite) -> Result<()>;

    async fn send_schedule_confirmation(&self, confirmation: &ScheduleConfirmation) -> Result<()>;

    async fn send_results_notice(&self, notice: &ResultsNotice) -> Result<()>;
}

/// Posts signed JSON events to the configured notification webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: String,
}

impl WebhookNotifier {
    pub fn new(target_url: String, secret: String, client: Client) -> Self {
        Self {
            client,
            target_url,
            secret,
        }
    }

    async fn post_event(&self, event: &str, payload: JsonValue) -> Result<()> {
        let body = serde_json::json!({ "event": event, "payload": payload }).to_string();
        let signature = self.sign(&body)?;

        let res = self
            .client
            .post(&self.target_url)
            .header("content-type", "application/json")
            .header("X-Webhook-Secret", &self.secret)
            .header("X-Webhook-Signature", signature)
            .body(body)
            .timeout(NOTIFY_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(Error::Upstream(format!(
                "Notification webhook returned {}",
                res.status()
            )));
        }
        Ok(())
    }

    fn sign(&self, body: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_scheduling_invite(&self, invite: &SchedulingInvite) -> Result<()> {
        self.post_event(
            "interview_invite",
            serde_json::json!({
                "candidate_id": invite.candidate_id,
                "candidate_name": invite.candidate_name,
                "candidate_email": invite.candidate_email,
                "job_title": invite.job_title,
                "scheduling_link": invite.scheduling_link,
            }),
        )
        .await
    }

    async fn send_schedule_confirmation(&self, confirmation: &ScheduleConfirmation) -> Result<()> {
        self.post_event(
            "interview_scheduled",
            serde_json::json!({
                "candidate_id": confirmation.candidate_id,
                "candidate_name": confirmation.candidate_name,
                "interview_datetime": confirmation.interview_datetime,
                "meeting_link": confirmation.meeting_link,
            }),
        )
        .await
    }

    async fn send_results_notice(&self, notice: &ResultsNotice) -> Result<()> {
        self.post_event(
            "interview_completed",
            serde_json::json!({
                "candidate_id": notice.candidate_id,
                "candidate_name": notice.candidate_name,
                "transcript_url": notice.transcript_url,
                "report_url": notice.report_url,
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_hex() {
        let notifier = WebhookNotifier::new(
            "http://localhost/webhook".into(),
            "whsec_test".into(),
            Client::new(),
        );
        let a = notifier.sign("{\"event\":\"x\"}").unwrap();
        let b = notifier.sign("{\"event\":\"x\"}").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
