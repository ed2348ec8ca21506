use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use interview_backend::services::agent_service::{HttpInterviewAgent, InterviewAgent};
use interview_backend::services::scheduler::{InterviewScheduler, SchedulerConfig};
use interview_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let agent_client = reqwest::Client::new();
        let agent: Arc<dyn InterviewAgent> = Arc::new(HttpInterviewAgent::new(
            config.agent_url.clone(),
            config.agent_secret.clone(),
            Duration::from_secs(config.dispatch_timeout_secs),
            agent_client,
        ));
        let scheduler = Arc::new(InterviewScheduler::new(
            app_state.store.clone(),
            agent,
            SchedulerConfig::from_config(config),
        ));
        // Runs until the process exits; the handle would allow a graceful
        // stop if we ever add one to the shutdown path.
        let _scheduler_handle = scheduler.start();
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let internal_api = Router::new()
        .route(
            "/api/internal/candidates/:id",
            get(routes::interview::get_candidate),
        )
        .route(
            "/api/internal/candidates/:id/review",
            post(routes::interview::review_candidate),
        )
        .route(
            "/api/internal/candidates/:id/interview",
            post(routes::interview::trigger_interview),
        )
        .route(
            "/api/internal/candidates/:id/cancel",
            post(routes::interview::cancel_interview),
        )
        .route(
            "/api/internal/analysis/extract",
            post(routes::analysis::extract_profile),
        )
        .route(
            "/api/internal/analysis/match",
            post(routes::analysis::match_candidate),
        )
        .route(
            "/api/internal/analysis/questions",
            post(routes::analysis::generate_questions),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_operator,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.internal_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let public_api = Router::new()
        .route(
            "/api/schedule/:token",
            get(routes::schedule::get_invite).post(routes::schedule::submit_schedule),
        )
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let agent_api = Router::new()
        .route(
            "/api/agent/interviews/:id/results",
            post(routes::callback::complete_interview),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_agent_secret,
        ));

    let app = base_routes
        .merge(internal_api)
        .merge(public_api)
        .merge(agent_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
