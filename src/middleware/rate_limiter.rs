// Rate limiting for routes that spend upstream API credits
// One process-wide governor bucket; exceeding it yields 429 before any work starts.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::models::{AppState, DecorationResponse};

/// Build the shared limiter; `None` when `per_minute` is 0
pub fn build_rate_limiter(per_minute: u32) -> Option<Arc<DefaultDirectRateLimiter>> {
    NonZeroU32::new(per_minute).map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))))
}

pub async fn rate_limiter_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            warn!(path = %req.uri().path(), "Rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(DecorationResponse::error("Too many requests. Please try again shortly.")),
            )
                .into_response();
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiter() {
        assert!(build_rate_limiter(0).is_none());
    }

    #[test]
    fn test_burst_is_quota_size() {
        let limiter = build_rate_limiter(2).unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
