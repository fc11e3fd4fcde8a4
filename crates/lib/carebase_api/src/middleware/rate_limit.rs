//! Per-client fixed-window request limiter.
//!
//! Clients are keyed by peer IP from [`ConnectInfo`]; requests served without
//! connection info share one bucket.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::RateLimit;
use crate::error::AppError;

/// Stale windows are swept once this many clients are tracked.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests per client within the configured window.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Mutex<HashMap<Option<IpAddr>, Window>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `client`; `false` once the window's allowance is spent.
    pub async fn allow(&self, client: Option<IpAddr>) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < self.limit.window);
        }

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.limit.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }
        window.count = window.count.saturating_add(1);
        window.count <= self.limit.max_requests
    }
}

/// Axum middleware: answers 429 once the client has spent its allowance.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !limiter.allow(client).await {
        debug!(?client, "rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }
    Ok(next.run(request).await)
}
