use axum::{Router, middleware, routing::any};

use crate::auth::{ExecutorToken, require_executor_token};
use crate::handlers;
use crate::policy::Caller;
use crate::state::AppState;

/// Path prefix of the user-facing mount API.
pub const MOUNT_PREFIX: &str = "/batches/mount";
/// Path prefix of the executor-facing mount API.
pub const EXECUTOR_MOUNT_PREFIX: &str = "/.executors/batches/mount";

pub fn api_routes(state: &AppState) -> Router {
    let mut router = Router::new().nest(MOUNT_PREFIX, mount_routes(state, Caller::User));

    match state.config.executor.token.as_deref() {
        Some(token) => {
            let executor = mount_routes(state, Caller::Executor).layer(
                middleware::from_fn_with_state(ExecutorToken::new(token), require_executor_token),
            );
            router = router.nest(EXECUTOR_MOUNT_PREFIX, executor);
        }
        None => tracing::info!("No executor token configured, executor mount routes disabled"),
    }

    router
}

/// Both route shapes accept every method; the handler dispatches on it.
fn mount_routes(state: &AppState, caller: Caller) -> Router {
    Router::new()
        .route("/{spec}", any(handlers::mount::serve_mount))
        .route("/{spec}/{mount}", any(handlers::mount::serve_mount))
        .layer(handlers::mount::mount_upload_body_limit(
            state.config.mount.max_upload_size,
        ))
        .with_state(state.for_caller(caller))
}
