use axum::extract::DefaultBodyLimit;
use axum::Router;
use crate::state::AppState;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    // Default axum body limit is 2MB; audio uploads need more.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    crate::routes::configure_routes()
        .layer(TraceLayer::new_for_http())
        .layer(body_limit)
        .with_state(state)
}
