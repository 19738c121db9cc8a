pub mod metrics;
pub mod rate_limit;
pub mod tracing;

pub use self::metrics::metrics_middleware;
pub use self::rate_limit::{
    IpRateLimitState, IpRateLimiter, create_ip_rate_limiter, ip_rate_limit_middleware,
};
pub use self::tracing::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
