use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::auth::require_basic_auth;
use crate::dispatch::dispatch;
use crate::state::AppState;

/// Build the axum router: one catch-all route into the verb dispatcher,
/// wrapped by the auth gate when a verifier is configured.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new().fallback(dispatch);
    let router = if state.verifier.is_some() {
        router.layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
    } else {
        router
    };
    router.layer(TraceLayer::new_for_http()).with_state(state)
}
