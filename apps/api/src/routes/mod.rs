pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::wizard::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Wizard session API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/outline",
            post(handlers::handle_generate_outline),
        )
        .route(
            "/api/v1/sessions/:id/outline/fallback",
            post(handlers::handle_use_fallback),
        )
        .route(
            "/api/v1/sessions/:id/assets",
            post(handlers::handle_generate_assets),
        )
        .route(
            "/api/v1/sessions/:id/chapters/:chapter_id",
            patch(handlers::handle_edit_chapter_title),
        )
        .route(
            "/api/v1/sessions/:id/chapters/:chapter_id/points/:point_id",
            patch(handlers::handle_edit_chapter_point),
        )
        .with_state(state)
}
