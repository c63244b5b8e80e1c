//! HTTP-level rate limiting middleware using a token bucket
//!
//! This bounds overall request throughput at the gateway. It is separate
//! from the sliding-window quota on generative-AI calls, which lives in
//! `vaultify_common::genai` and protects the upstream API budget.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create a new rate limiter
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Arc<GlobalRateLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap())
        .allow_burst(NonZeroU32::new(burst.max(1)).unwrap());

    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
    limiter: Arc<GlobalRateLimiter>,
) -> Result<Response, StatusCode> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Gateway rate limit exceeded");
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(100, 200);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_burst_exhaustion() {
        let limiter = create_rate_limiter(1, 2);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
