//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use survey_common::config::{PaginationConfig, SessionConfig};
use survey_core::{
    ChoiceService, PollService, QuestionService, SessionService, SubmissionService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub session_service: SessionService,
    pub poll_service: PollService,
    pub question_service: QuestionService,
    pub choice_service: ChoiceService,
    pub submission_service: SubmissionService,
    pub session_config: SessionConfig,
    pub pagination: PaginationConfig,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token into the signed-in [`survey_db::entities::user::Model`]
/// and stores it in the request extensions. Requests without a valid token
/// pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown bearer token"),
            Err(e) => tracing::warn!(error = %e, "Failed to resolve bearer token"),
        }
    }

    next.run(req).await
}
