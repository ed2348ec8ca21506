use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

struct Window {
    rps: u32,
    started: Instant,
    epoch: AtomicU64,
    count: AtomicU32,
}

/// Fixed one-second window, lock-free. The count reset on an epoch change
/// is racy by a request or two, which is fine for a coarse limiter.
#[derive(Clone)]
pub struct RateLimiter {
    window: Arc<Window>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            window: Arc::new(Window {
                rps: rps.max(1),
                started: Instant::now(),
                epoch: AtomicU64::new(0),
                count: AtomicU32::new(0),
            }),
        }
    }

    fn allow(&self) -> bool {
        let w = &self.window;
        let current = w.started.elapsed().as_secs();
        let seen = w.epoch.load(Ordering::Acquire);
        if seen != current
            && w.epoch
                .compare_exchange(seen, current, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            w.count.store(0, Ordering::Release);
        }
        w.count.fetch_add(1, Ordering::AcqRel) < w.rps
    }
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}
