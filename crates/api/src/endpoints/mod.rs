//! API endpoints.

mod auth;
mod choices;
mod polls;
mod questions;
mod user_forms;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(polls::router())
        .merge(questions::router())
        .merge(choices::router())
        .merge(user_forms::router())
}
