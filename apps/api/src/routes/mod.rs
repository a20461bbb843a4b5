pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::entries::handlers;
use crate::forms::handlers as forms;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Entry schemas
        .route(
            "/api/v1/entry-types/:entry_type",
            get(handlers::handle_get_schema),
        )
        .route(
            "/api/v1/entries/normalize",
            post(handlers::handle_normalize),
        )
        // Editor sessions
        .route(
            "/api/v1/editor/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/editor/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_close_session),
        )
        .route(
            "/api/v1/editor/sessions/:id/compose",
            post(handlers::handle_compose),
        )
        .route(
            "/api/v1/editor/sessions/:id/entries/:index",
            axum::routing::delete(handlers::handle_delete_entry),
        )
        .route(
            "/api/v1/editor/sessions/:id/entries/:index/edit",
            post(handlers::handle_edit_entry),
        )
        .route(
            "/api/v1/editor/sessions/:id/draft",
            patch(handlers::handle_update_draft),
        )
        .route(
            "/api/v1/editor/sessions/:id/submit",
            post(handlers::handle_submit),
        )
        .route(
            "/api/v1/editor/sessions/:id/cancel",
            post(handlers::handle_cancel),
        )
        .route(
            "/api/v1/editor/sessions/:id/improve",
            post(handlers::handle_improve),
        )
        // Stateless form validation
        .route(
            "/api/v1/onboarding/validate",
            post(forms::handle_validate_onboarding),
        )
        .route(
            "/api/v1/contact/validate",
            post(forms::handle_validate_contact),
        )
        .route(
            "/api/v1/resumes/validate",
            post(forms::handle_validate_resume),
        )
        .route(
            "/api/v1/cover-letters/validate",
            post(forms::handle_validate_cover_letter),
        )
        .with_state(state)
}
