use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::{HashMap, VecDeque},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::error::ApiError;

/// Fifteen minutes, the window every limiter in this service uses
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window limiter keyed by caller IP.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    message: &'static str,
    hits: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
}

/// Outcome of one check, in the shape of the `RateLimit-*` response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    /// Time until the oldest request in the window expires
    pub reset_after: Duration,
}

impl RateLimitStatus {
    /// Whole seconds until the window frees a slot, rounded up
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    fn write_headers(&self, headers: &mut HeaderMap) {
        let values = [
            (RATELIMIT_LIMIT, self.limit as u64),
            (RATELIMIT_REMAINING, self.remaining as u64),
            (RATELIMIT_RESET, self.reset_secs()),
        ];
        // The innermost limiter answers first and keeps its values
        for (name, value) in values {
            headers
                .entry(HeaderName::from_static(name))
                .or_insert_with(|| HeaderValue::from(value));
        }
    }
}

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
const RATELIMIT_RESET: &str = "ratelimit-reset";

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, message: &'static str) -> Self {
        Self {
            max_requests,
            window,
            message,
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `ip` at `now`. Rejected requests are not recorded.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitStatus {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let expired = |at: &Instant| now.saturating_duration_since(*at) >= self.window;

        // Forget callers whose last request fell out of the window
        hits.retain(|_, times| times.back().is_some_and(|last| !expired(last)));

        let times = hits.entry(ip).or_default();
        while times.front().is_some_and(|first| expired(first)) {
            times.pop_front();
        }

        let allowed = times.len() < self.max_requests;
        if allowed {
            times.push_back(now);
        }

        let reset_after = times
            .front()
            .map(|first| self.window.saturating_sub(now.saturating_duration_since(*first)))
            .unwrap_or(self.window);

        RateLimitStatus {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(times.len()),
            reset_after,
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateLimitStatus {
        self.check_at(ip, Instant::now())
    }
}

/// Middleware rejecting callers over the limit with 429 and `Retry-After`.
/// Every response carries `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`.
/// Requests without connection info (in-process tests) share the unspecified address.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let status = limiter.check(ip);
    if !status.allowed {
        let mut response = ApiError::TooManyRequests(limiter.message.to_string()).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(status.reset_secs()));
        status.write_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    status.write_headers(response.headers_mut());
    response
}
