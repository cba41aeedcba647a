//! Rate limiting middleware.
//!
//! Implements a per-client sliding window log: at most [`RATE_LIMIT`]
//! admitted requests per client address within the trailing
//! [`RATE_WINDOW`].

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State, connect_info::MockConnectInfo},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use items_types::AppError;

use super::handlers::ApiError;

/// Admitted requests allowed per client within one window.
pub const RATE_LIMIT: usize = 5;

/// Length of the trailing window.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter state shared across requests.
///
/// Client entries are never evicted; a client's list is only pruned when
/// that client is checked again.
pub struct SlidingWindowLimiter {
    /// Admitted request instants per client address
    windows: DashMap<String, VecDeque<Instant>>,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Checks if a request from `client` should be admitted now.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit current instant.
    ///
    /// Prune, count and append happen under the entry's shard lock.
    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(client.to_string())
            .or_insert_with(|| VecDeque::with_capacity(RATE_LIMIT));

        window.retain(|&t| now.saturating_duration_since(t) < RATE_WINDOW);

        if window.len() >= RATE_LIMIT {
            return false;
        }

        window.push_back(now);
        true
    }

    /// Number of client addresses with an entry.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Peer IP of the request, or `"unknown"` when the server was not started
/// with connection info.
fn client_address(request: &Request<Body>) -> String {
    let extensions = request.extensions();

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| {
            extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware keyed by client address.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_address(&request);

    if !limiter.check(&client) {
        tracing::warn!(client = %client, "rate limit exceeded");
        return ApiError(AppError::RateLimited).into_response();
    }

    next.run(request).await
}
