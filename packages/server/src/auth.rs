use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::plain_text;

/// Shared secret expected from executors.
#[derive(Clone)]
pub struct ExecutorToken(Arc<str>);

impl ExecutorToken {
    pub fn new(token: &str) -> Self {
        Self(Arc::from(token))
    }

    /// Compare without short-circuiting on the first differing byte.
    fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len()
            && expected
                .iter()
                .zip(candidate)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// Rejects requests that do not carry `Authorization: token-executor <token>`.
pub async fn require_executor_token(
    State(token): State<ExecutorToken>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("token-executor "))
        .is_some_and(|candidate| token.matches(candidate));

    if !authorized {
        warn!(uri = %request.uri(), "Rejected executor request with invalid token");
        return plain_text(StatusCode::UNAUTHORIZED, "invalid executor token");
    }

    next.run(request).await
}
