use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::AppState;

const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Clone)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

/// Fixed-window limiter keyed by client identity.
#[derive(Clone)]
pub struct RateLimiter {
    // Map of client key -> rate limit entry
    limits: Arc<RwLock<HashMap<String, RateLimitEntry>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            limits: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// When 0, rate limiting is disabled (useful for local dev/testing).
    pub fn is_disabled(&self) -> bool {
        self.max_requests == 0
    }

    pub async fn check(&self, key: &str) -> Result<(), RateLimited> {
        self.check_at(key, Instant::now()).await
    }

    pub async fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        if self.is_disabled() {
            return Ok(());
        }

        let mut limits = self.limits.write().await;

        if limits.len() > PRUNE_THRESHOLD {
            limits.retain(|_, entry| entry.reset_at > now);
        }

        match limits.get_mut(key) {
            Some(entry) => {
                if entry.reset_at <= now {
                    entry.count = 1;
                    entry.reset_at = now + self.window;
                    return Ok(());
                }

                if entry.count >= self.max_requests {
                    return Err(RateLimited {
                        retry_after: entry.reset_at.saturating_duration_since(now),
                    });
                }

                entry.count += 1;
                Ok(())
            }
            None => {
                limits.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.limits.read().await.len()
    }
}

/// Client identity. Forwarding headers (first `X-Forwarded-For` hop, then
/// `X-Real-IP`) are only honoured when `trust_proxy_headers` is set, since any
/// client can send them; otherwise the key is the peer address.
pub fn extract_client_key(req: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_client(req) {
            return ip;
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client(req: &Request) -> Option<String> {
    if let Some(forwarded_for) = req.headers().get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = forwarded_for.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
            return Some(ip.to_string());
        }
    }

    req.headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

pub async fn chat_rate_limit_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = extract_client_key(&req, state.config.trust_proxy_headers);
    if let Err(limited) = state.chat_limiter.check(&key).await {
        tracing::warn!(client = %key, retry_after_secs = limited.retry_after.as_secs(), "Chat rate limit exceeded");
        return AppError::RateLimited {
            retry_after: limited.retry_after,
        }
        .into_response();
    }
    next.run(req).await
}
