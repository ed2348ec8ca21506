pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use reqwest::Client;
use sqlx::PgPool;

use crate::services::analysis::AnalysisService;
use crate::services::interview_service::InterviewService;
use crate::services::notification_service::{Notifier, WebhookNotifier};
use crate::store::{InterviewStore, PgInterviewStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InterviewStore>,
    pub interview_service: InterviewService,
    pub analysis_service: AnalysisService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let store: Arc<dyn InterviewStore> = Arc::new(PgInterviewStore::new(pool));
        let notifier: Arc<dyn Notifier> = Arc::new(WebhookNotifier::new(
            config.notification_webhook_url.clone(),
            config.webhook_secret.clone(),
            http_client.clone(),
        ));
        let analysis_service = AnalysisService::new(config.openai_api_key.clone(), http_client);

        Self::with_parts(store, notifier, analysis_service)
    }

    /// Wire the state from explicit collaborators; tests swap in the
    /// in-memory store and recording notifiers here.
    pub fn with_parts(
        store: Arc<dyn InterviewStore>,
        notifier: Arc<dyn Notifier>,
        analysis_service: AnalysisService,
    ) -> Self {
        let interview_service = InterviewService::new(store.clone(), notifier);
        Self {
            store,
            interview_service,
            analysis_service,
        }
    }
}
