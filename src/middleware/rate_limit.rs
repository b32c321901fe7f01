//! Fixed-window rate limiting keyed by client identity and preset.
//!
//! Each `<preset>:<identity>` key owns one window. The first request opens the window;
//! requests are admitted while the window's count is below the preset quota and the
//! (N+1)-th request inside the window is rejected with `429` and a `Retry-After` hint.
//! The check and the increment happen under one lock, so concurrent requests for the
//! same key can never over-admit.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::auth::validate_jwt;
use crate::config::{AppConfig, RateLimitQuota};
use crate::error::ApiError;
use crate::types::RateLimitPreset;

/// Rate limit header names.
pub mod headers {
    pub const LIMIT: &str = "x-ratelimit-limit";
    pub const REMAINING: &str = "x-ratelimit-remaining";
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { limit: u32, remaining: u32 },
    Limited { limit: u32, retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Shared counter table; the only cross-request mutable state in the service.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, key: &str, quota: RateLimitQuota) -> RateDecision {
        self.check_at(key, quota, Instant::now())
    }

    fn check_at(&self, key: &str, quota: RateLimitQuota, now: Instant) -> RateDecision {
        let length = Duration::from_secs(quota.window_secs);
        // A panic while holding the lock cannot leave a window half-updated
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            length,
            count: 0,
        });
        if now.duration_since(window.started) >= window.length {
            *window = Window {
                started: now,
                length,
                count: 0,
            };
        }

        if window.count < quota.requests {
            window.count += 1;
            RateDecision::Allowed {
                limit: quota.requests,
                remaining: quota.requests - window.count,
            }
        } else {
            let elapsed = now.duration_since(window.started);
            RateDecision::Limited {
                limit: quota.requests,
                retry_after: window.length.saturating_sub(elapsed),
            }
        }
    }

    /// Drop windows that have already expired. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < w.length);
        before - windows.len()
    }

    pub fn len(&self) -> usize {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically sweep expired windows so idle identities do not accumulate.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(removed, remaining = limiter.len(), "Swept expired rate-limit windows");
                }
            }
        })
    }
}

/// Seconds to advertise in `Retry-After`; never zero while limited.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Per-router middleware state: which preset applies and the limiter it counts against.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<RateLimiter>,
    preset: RateLimitPreset,
    quota: RateLimitQuota,
    enabled: bool,
    jwt_secret: Arc<str>,
}

impl RateLimitState {
    pub fn new(limiter: Arc<RateLimiter>, config: &AppConfig, preset: RateLimitPreset) -> Self {
        Self {
            limiter,
            preset,
            quota: config.api.quota(preset),
            enabled: config.api.enable_rate_limiting,
            jwt_secret: Arc::from(config.security.jwt_secret.as_str()),
        }
    }
}

/// Identity used for counting. Only a token that verifies counts as a user identity,
/// keyed on its subject, so every token a user holds shares one window. Missing or
/// unverifiable tokens fall back to the peer address.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, jwt_secret: &str) -> String {
    let subject = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .and_then(|token| validate_jwt(token, jwt_secret).ok())
        .map(|claims| claims.sub);

    if let Some(sub) = subject {
        return format!("user:{}", sub);
    }

    match peer {
        Some(addr) => format!("ip:{}", addr.ip()),
        None => "anonymous".to_string(),
    }
}

pub async fn rate_limit_middleware(
    State(layer): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    if !layer.enabled {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_identity(request.headers(), peer, &layer.jwt_secret);
    let key = format!("{}:{}", layer.preset.as_str(), identity);

    match layer.limiter.check(&key, layer.quota) {
        RateDecision::Allowed { limit, remaining } => {
            let mut response = next.run(request).await;
            set_limit_headers(response.headers_mut(), limit, remaining);
            response
        }
        RateDecision::Limited { limit, retry_after } => {
            let retry_after_secs = retry_after_secs(retry_after);
            tracing::warn!(
                preset = layer.preset.as_str(),
                identity = %identity,
                retry_after_secs,
                "Rate limit exceeded"
            );
            let mut response = ApiError::too_many_requests(
                format!("Too many requests. Try again in {} seconds", retry_after_secs),
                retry_after_secs,
            )
            .into_response();
            set_limit_headers(response.headers_mut(), limit, 0);
            response
        }
    }
}

fn set_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(headers::LIMIT, HeaderValue::from(limit));
    headers.insert(headers::REMAINING, HeaderValue::from(remaining));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_request_past_quota() {
        let limiter = RateLimiter::new();
        let quota = RateLimitQuota::new(3, 60);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check_at("STANDARD:ip:10.0.0.1", quota, now),
                RateDecision::Allowed { limit: 3, remaining: expected_remaining }
            );
        }

        match limiter.check_at("STANDARD:ip:10.0.0.1", quota, now + Duration::from_secs(10)) {
            RateDecision::Limited { limit, retry_after } => {
                assert_eq!(limit, 3);
                assert_eq!(retry_after, Duration::from_secs(50));
            }
            other => panic!("expected limited, got {:?}", other),
        }
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new();
        let quota = RateLimitQuota::new(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("STANDARD:a", quota, now).is_allowed());
        assert!(!limiter.check_at("STANDARD:a", quota, now).is_allowed());
        assert!(limiter.check_at("STANDARD:b", quota, now).is_allowed());
        assert!(limiter.check_at("STRICT:a", quota, now).is_allowed());
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = RateLimiter::new();
        let quota = RateLimitQuota::new(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("k", quota, now).is_allowed());
        assert!(!limiter.check_at("k", quota, now + Duration::from_secs(59)).is_allowed());
        assert!(limiter.check_at("k", quota, now + Duration::from_secs(60)).is_allowed());
    }

    #[test]
    fn concurrent_checks_never_over_admit() {
        let limiter = Arc::new(RateLimiter::new());
        let quota = RateLimitQuota::new(50, 60);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..25).filter(|_| limiter.check("shared", quota).is_allowed()).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }

    #[test]
    fn sweep_removes_only_expired_windows() {
        let limiter = RateLimiter::new();
        let now = Instant::now();
        limiter.check_at("short", RateLimitQuota::new(5, 1), now);
        limiter.check_at("long", RateLimitQuota::new(5, 60), now);

        assert_eq!(limiter.sweep_at(now + Duration::from_secs(2)), 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::from_secs(3)), 3);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn identity_uses_verified_subject_only() {
        use crate::auth::{generate_jwt, Claims};
        use crate::types::Role;

        const SECRET: &str = "unit-test-secret";
        let peer: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_identity(&headers, Some(peer), SECRET), "ip:192.168.1.9");
        assert_eq!(client_identity(&headers, None, SECRET), "anonymous");

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(client_identity(&headers, Some(peer), SECRET), "ip:192.168.1.9");

        let user_id = uuid::Uuid::new_v4();
        let first = generate_jwt(&Claims::new(user_id, "a@example.com".into(), Role::Client, 1), SECRET).unwrap();
        let second = generate_jwt(&Claims::new(user_id, "a@example.com".into(), Role::Client, 2), SECRET).unwrap();
        for token in [first, second] {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
            assert_eq!(client_identity(&headers, Some(peer), SECRET), format!("user:{}", user_id));
        }

        // Signed with another secret
        assert_eq!(client_identity(&headers, Some(peer), "other-secret"), "ip:192.168.1.9");
    }

    #[test]
    fn junk_tokens_from_one_peer_share_a_window() {
        let limiter = RateLimiter::new();
        let quota = RateLimitQuota::new(2, 60);
        let peer: SocketAddr = "10.1.1.1:4000".parse().unwrap();

        let admitted = (0..100)
            .filter(|i| {
                let mut headers = HeaderMap::new();
                let value = HeaderValue::from_str(&format!("Bearer junk-{}", i)).unwrap();
                headers.insert(header::AUTHORIZATION, value);
                let key = format!("STRICT:{}", client_identity(&headers, Some(peer), "unit-test-secret"));
                limiter.check(&key, quota).is_allowed()
            })
            .count();

        assert_eq!(admitted, 2);
        assert_eq!(limiter.len(), 1);
    }
}
