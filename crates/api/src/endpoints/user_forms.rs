//! User form endpoints: poll submissions by anonymous sessions.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use survey_common::{AppError, AppResult, SessionKey, config::SessionConfig};
use survey_core::{Operation, Page, Policy, SubmitInput, authorize, submission_scope};

use crate::{
    extractors::{MaybeAuthUser, PageParams, session_key},
    middleware::AppState,
    response::{Created, UserFormResponse},
};

/// Build the cookie that carries a freshly provisioned session.
fn session_cookie(
    config: &SessionConfig,
    key: &SessionKey,
    max_age_secs: i64,
) -> AppResult<Cookie<'static>> {
    let mut cookie = Cookie::parse(format!(
        "{}={}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name,
        key.as_str()
    ))
    .map_err(|e| AppError::Internal(format!("Failed to build session cookie: {e}")))?;
    cookie.set_secure(config.secure_cookie);
    Ok(cookie)
}

/// Submit answers to a poll.
///
/// A session is provisioned when the request carries none. Its cookie is
/// returned whether or not the submission is accepted.
async fn create(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<SubmitInput>,
) -> AppResult<(CookieJar, Response)> {
    authorize(Policy::SubmitOrOwnRead, user.caller(), Operation::Create)?;

    let current = session_key(&jar, &state.session_config.cookie_name);
    let (key, created) = state
        .session_service
        .resolve_or_provision(current.as_ref())
        .await?;

    let jar = if created {
        let ttl = state.session_service.ttl().num_seconds();
        jar.add(session_cookie(&state.session_config, &key, ttl)?)
    } else {
        jar
    };

    let response = state
        .submission_service
        .submit(&key, input)
        .await
        .map(|form| Created(UserFormResponse::from(form)))
        .into_response();

    Ok((jar, response))
}

/// List submissions: all of them for administrators, otherwise the
/// caller's own.
async fn list(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<UserFormResponse>>> {
    let caller = user.caller();
    authorize(Policy::SubmitOrOwnRead, caller, Operation::Read)?;

    let session = match session_key(&jar, &state.session_config.cookie_name) {
        Some(key) => state.session_service.resolve(&key).await?,
        None => None,
    };
    let scope = submission_scope(caller, session.as_ref());

    let page = state
        .submission_service
        .list(&scope, params.resolve(&state.pagination))
        .await?;
    Ok(Json(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user_forms/create/", post(create))
        .route("/user_forms/", get(list))
}
