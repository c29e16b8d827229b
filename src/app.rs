use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/logger/tab", post(handlers::select_tab))
        .route("/logger/submit", post(handlers::submit))
        .route("/dashboard", get(handlers::dashboard))
        .route("/api/logger", get(handlers::get_logger))
        .route("/api/logger/tab", post(handlers::api_select_tab))
        .route("/api/logger/fields", post(handlers::api_set_fields))
        .route("/api/logger/submit", post(handlers::api_submit))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/health", get(handlers::health))
        .with_state(state)
}
