use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(handlers::get_own_profile).put(handlers::update_profile),
        )
        .route("/profile/skills", put(handlers::update_skills))
        .route("/profile/photo", post(handlers::update_photo))
        .route("/profile/cv", post(handlers::upload_cv))
        .route("/profile/:id", get(handlers::get_profile))
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
}
