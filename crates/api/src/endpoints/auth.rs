//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use survey_common::AppResult;
use survey_core::SigninInput;

use crate::middleware::AppState;

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub username: String,
    pub token: String,
    pub is_admin: bool,
}

/// Exchange credentials for a bearer token.
async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SigninInput>,
) -> AppResult<Json<SigninResponse>> {
    let user = state.user_service.authenticate(input).await?;

    tracing::debug!(username = %user.username, "User signed in");

    Ok(Json(SigninResponse {
        id: user.id,
        username: user.username,
        token: user.token.unwrap_or_default(),
        is_admin: user.is_admin,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/signin/", post(signin))
}
