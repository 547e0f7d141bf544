//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use precis_common::errors::{AppError, Result};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create a new rate limiter; both values must be non-zero
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Result<Arc<GlobalRateLimiter>> {
    let rps = NonZeroU32::new(requests_per_second).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.requests_per_second must be greater than zero".to_string(),
    })?;
    let burst = NonZeroU32::new(burst).ok_or_else(|| AppError::Configuration {
        message: "rate_limit.burst must be greater than zero".to_string(),
    })?;

    let quota = Quota::per_second(rps).allow_burst(burst);
    Ok(Arc::new(RateLimiter::direct(quota)))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
    limiter: Arc<GlobalRateLimiter>,
    limit: u32,
) -> Result<Response> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            Err(AppError::RateLimited { limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(100, 200).unwrap();
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(create_rate_limiter(0, 10).is_err());
        assert!(create_rate_limiter(10, 0).is_err());
    }

    #[test]
    fn test_burst_exhaustion() {
        let limiter = create_rate_limiter(1, 2).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
