use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Rate limiter keyed by client IP address
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>>;

/// Create a keyed rate limiter allowing `attempts` requests per `window_seconds`.
///
/// The whole allowance is available as a burst and replenishes evenly across
/// the window.
pub fn create_ip_rate_limiter(attempts: u32, window_seconds: u64) -> IpRateLimiter {
    let attempts = attempts.max(1);
    let period_ms = ((window_seconds * 1000) / attempts as u64).max(1);
    let quota = Quota::with_period(Duration::from_millis(period_ms))
        .expect("Failed to create quota with valid period")
        .allow_burst(NonZeroU32::new(attempts).expect("attempts is guaranteed to be non-zero"));

    Arc::new(RateLimiter::dashmap(quota))
}

/// Limiter plus the policy for identifying the client.
///
/// `x-forwarded-for` is only honoured when `trust_forwarded` is set, i.e. when
/// every request arrives through a proxy that overwrites the header. Otherwise
/// the socket peer is the key.
#[derive(Clone)]
pub struct IpRateLimitState {
    pub limiter: IpRateLimiter,
    pub trust_forwarded: bool,
}

impl IpRateLimitState {
    pub fn new(limiter: IpRateLimiter, trust_forwarded: bool) -> Self {
        Self {
            limiter,
            trust_forwarded,
        }
    }
}

fn forwarded_ip(request: &Request) -> Option<IpAddr> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

fn peer_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn client_ip(request: &Request, trust_forwarded: bool) -> Option<IpAddr> {
    if trust_forwarded {
        forwarded_ip(request).or_else(|| peer_ip(request))
    } else {
        peer_ip(request)
    }
}

/// Middleware for IP-based rate limiting
pub async fn ip_rate_limit_middleware(
    State(state): State<IpRateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match client_ip(&request, state.trust_forwarded) {
        Some(ip) => match state.limiter.check_key(&ip) {
            Ok(_) => Ok(next.run(request).await),
            Err(negative) => {
                let wait_time = negative.wait_time_from(DefaultClock::default().now());
                tracing::warn!(client_ip = %ip, "Rate limit exceeded");
                Err(AppError::TooManyRequests(
                    RATE_LIMIT_MESSAGE.to_string(),
                    Some(wait_time.as_secs()),
                ))
            }
        },
        None => {
            tracing::warn!("Could not determine IP for rate limiting");
            Ok(next.run(request).await)
        }
    }
}
