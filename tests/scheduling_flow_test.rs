use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use interview_backend::middleware::auth::Claims;
use interview_backend::models::candidate::{Candidate, InterviewStatus};
use interview_backend::models::job::Job;
use interview_backend::services::agent_service::{DispatchRequest, InterviewAgent};
use interview_backend::services::analysis::AnalysisService;
use interview_backend::services::notification_service::{
    Notifier, ResultsNotice, ScheduleConfirmation, SchedulingInvite,
};
use interview_backend::services::scheduler::{InterviewScheduler, SchedulerConfig};
use interview_backend::store::{InterviewStore, MemoryInterviewStore};
use interview_backend::AppState;

fn ensure_config() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/unused");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("AGENT_SECRET", "agent_shared_secret");
    env::set_var("AGENT_URL", "http://localhost:9/agent");
    env::set_var("NOTIFICATION_WEBHOOK_URL", "http://localhost:9/webhook");
    env::set_var("WEBHOOK_SECRET", "whsec_test");
    env::set_var("SCHEDULING_BASE_URL", "http://localhost/schedule");
    env::set_var("MEETING_BASE_URL", "http://localhost/meet");
    env::set_var("INTERNAL_RPS", "100");
    env::set_var("PUBLIC_RPS", "100");
    let _ = interview_backend::config::init_config();
}

#[derive(Default)]
struct RecordingNotifier {
    invites: AtomicUsize,
    confirmations: AtomicUsize,
    results: AtomicUsize,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_scheduling_invite(
        &self,
        _invite: &SchedulingInvite,
    ) -> interview_backend::error::Result<()> {
        self.invites.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_schedule_confirmation(
        &self,
        _confirmation: &ScheduleConfirmation,
    ) -> interview_backend::error::Result<()> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_results_notice(
        &self,
        _notice: &ResultsNotice,
    ) -> interview_backend::error::Result<()> {
        self.results.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct CountingAgent {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl InterviewAgent for CountingAgent {
    async fn dispatch_interview(
        &self,
        _request: &DispatchRequest,
    ) -> interview_backend::error::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn seeded_state() -> (AppState, Arc<MemoryInterviewStore>, Arc<RecordingNotifier>, Uuid) {
    let store = Arc::new(MemoryInterviewStore::new());
    store.insert_job(Job {
        id: 1,
        org_id: 1,
        title: "Backend Engineer".into(),
        description: "Design and run our services".into(),
        required_skills: vec!["Rust".into(), "PostgreSQL".into()],
        created_at: Some(Utc::now()),
    });
    let candidate_id = Uuid::new_v4();
    store.insert_candidate(Candidate {
        id: candidate_id,
        org_id: 1,
        job_id: 1,
        name: "Dana Petrova".into(),
        email: "dana@example.com".into(),
        resume_text: Some(
            "Dana Petrova\ndana@example.com\nRust and PostgreSQL, 6 years".into(),
        ),
        interview_status: InterviewStatus::ResumeReviewed,
        interview_datetime: None,
        meeting_link: None,
        scheduler_token: None,
        transcript_url: None,
        report_url: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    });

    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::with_parts(
        store.clone(),
        notifier.clone(),
        AnalysisService::heuristic_only(),
    );
    (state, store, notifier, candidate_id)
}

fn build_app(state: AppState) -> Router {
    let internal_api = Router::new()
        .route(
            "/api/internal/candidates/:id/interview",
            post(interview_backend::routes::interview::trigger_interview),
        )
        .layer(axum::middleware::from_fn(
            interview_backend::middleware::auth::require_operator,
        ));

    let public_api = Router::new().route(
        "/api/schedule/:token",
        get(interview_backend::routes::schedule::get_invite)
            .post(interview_backend::routes::schedule::submit_schedule),
    );

    let agent_api = Router::new()
        .route(
            "/api/agent/interviews/:id/results",
            post(interview_backend::routes::callback::complete_interview),
        )
        .layer(axum::middleware::from_fn(
            interview_backend::middleware::auth::require_agent_secret,
        ));

    internal_api
        .merge(public_api)
        .merge(agent_api)
        .with_state(state)
}

fn operator_token(org_id: i64) -> String {
    let claims = Claims {
        sub: "op-1".into(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        role: Some("hr".into()),
        org_id,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test_secret_key"),
    )
    .expect("encode jwt")
}

async fn json_body(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn full_pipeline_trigger_schedule_sweep_callback() {
    ensure_config();
    let (state, store, notifier, candidate_id) = seeded_state();
    let app = build_app(state);

    // Operator triggers the interview.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/internal/candidates/{}/interview", candidate_id))
        .header("authorization", format!("Bearer {}", operator_token(1)))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["interview_status"], "interview_requested");
    assert_eq!(notifier.invites.load(Ordering::SeqCst), 1);

    // The token is delivered to the candidate out of band; read it back
    // from the store the way the scheduling link would embed it.
    let token = store
        .get_record(candidate_id)
        .await
        .unwrap()
        .unwrap()
        .scheduler_token
        .expect("token issued");

    // Public page shows the invite.
    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/schedule/{}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["candidate_name"], "Dana Petrova");
    assert_eq!(body["job_title"], "Backend Engineer");

    // Candidate picks a slot a few minutes out, so the sweep below can
    // use a realistic clock without tripping the stuck-interview cutoff.
    let appointment = Utc::now() + Duration::minutes(5);
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/schedule/{}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "datetime": appointment }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["interview_status"], "scheduled");
    let meeting_link = body["meeting_link"].as_str().unwrap().to_string();
    assert!(!meeting_link.is_empty());
    assert_eq!(notifier.confirmations.load(Ordering::SeqCst), 1);

    // Re-using the consumed token fails without touching the schedule.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/schedule/{}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "datetime": appointment }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let current = store.get_record(candidate_id).await.unwrap().unwrap();
    assert_eq!(current.interview_datetime, Some(appointment));
    assert_eq!(current.meeting_link.as_deref(), Some(meeting_link.as_str()));

    // Scheduler sweep one minute after the appointment claims and
    // dispatches exactly once.
    let agent = Arc::new(CountingAgent::default());
    let scheduler = InterviewScheduler::new(
        store.clone(),
        agent.clone(),
        SchedulerConfig {
            poll_interval: std::time::Duration::from_secs(60),
            dispatch_timeout: std::time::Duration::from_secs(5),
            max_interview_minutes: 180,
        },
    );
    let report = scheduler.sweep(appointment + Duration::minutes(1)).await;
    assert_eq!(report.dispatched, 1);
    assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    let current = store.get_record(candidate_id).await.unwrap().unwrap();
    assert_eq!(current.interview_status, InterviewStatus::InProgress);

    // Agent reports results.
    let results = json!({
        "transcript_url": "https://storage.example.com/transcripts/1",
        "report_url": "https://storage.example.com/reports/1",
    });
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/agent/interviews/{}/results", candidate_id))
        .header("content-type", "application/json")
        .header("x-agent-secret", "agent_shared_secret")
        .body(Body::from(results.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["interview_status"], "completed");
    assert_eq!(body["already_recorded"], false);
    assert_eq!(notifier.results.load(Ordering::SeqCst), 1);

    // The agent retries; the repeat is a safe no-op with no second notice.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/agent/interviews/{}/results", candidate_id))
        .header("content-type", "application/json")
        .header("x-agent-secret", "agent_shared_secret")
        .body(Body::from(results.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["already_recorded"], true);
    assert_eq!(
        body["transcript_url"],
        "https://storage.example.com/transcripts/1"
    );
    assert_eq!(notifier.results.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn trigger_requires_matching_organization() {
    ensure_config();
    let (state, _store, _notifier, candidate_id) = seeded_state();
    let app = build_app(state);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/internal/candidates/{}/interview", candidate_id))
        .header("authorization", format!("Bearer {}", operator_token(42)))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn trigger_requires_a_bearer_token() {
    ensure_config();
    let (state, _store, _notifier, candidate_id) = seeded_state();
    let app = build_app(state);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/internal/candidates/{}/interview", candidate_id))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_candidate_is_not_found() {
    ensure_config();
    let (state, _store, _notifier, _candidate_id) = seeded_state();
    let app = build_app(state);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/internal/candidates/{}/interview", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", operator_token(1)))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
