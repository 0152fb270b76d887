mod api;
mod form;
mod health;

use axum::Router;
use api::api_router;
use form::form_router;
use health::health_router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(form_router())
        .nest("/api", api_router())
        .nest("/health", health_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
