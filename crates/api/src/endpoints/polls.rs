//! Poll endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use survey_common::AppResult;
use survey_core::{
    CreatePollInput, Operation, Page, Policy, UpdatePollInput, authorize, poll_visibility,
};

use crate::{
    extractors::{MaybeAuthUser, PageParams},
    middleware::AppState,
    response::{Created, PollResponse, no_content},
};

/// Create a poll.
async fn create(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePollInput>,
) -> AppResult<Created<PollResponse>> {
    authorize(Policy::AdminOnly, user.caller(), Operation::Create)?;
    let poll = state.poll_service.create(input).await?;
    Ok(Created(poll.into()))
}

/// List polls. Non-administrators only see polls that are currently running.
async fn list(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<PollResponse>>> {
    let caller = user.caller();
    authorize(Policy::AdminOrReadOnly, caller, Operation::Read)?;

    let page = state
        .poll_service
        .list(
            poll_visibility(caller, Utc::now()),
            params.resolve(&state.pagination),
        )
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PollResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Read)?;
    let poll = state.poll_service.get(&id).await?;
    Ok(Json(poll.into()))
}

/// Replace every writable field.
async fn replace(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreatePollInput>,
) -> AppResult<Json<PollResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let poll = state.poll_service.update(&id, input.into()).await?;
    Ok(Json(poll.into()))
}

async fn update(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePollInput>,
) -> AppResult<Json<PollResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let poll = state.poll_service.update(&id, input).await?;
    Ok(Json(poll.into()))
}

async fn delete(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Delete)?;
    state.poll_service.delete(&id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/polls/create/", post(create))
        .route("/polls/", get(list))
        .route(
            "/polls/{id}/",
            get(show).put(replace).patch(update).delete(delete),
        )
}
