//! Choice endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use survey_common::AppResult;
use survey_core::{CreateChoiceInput, Operation, Page, Policy, UpdateChoiceInput, authorize};

use crate::{
    extractors::{MaybeAuthUser, PageParams},
    middleware::AppState,
    response::{ChoiceResponse, Created, no_content},
};

async fn create(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateChoiceInput>,
) -> AppResult<Created<ChoiceResponse>> {
    authorize(Policy::AdminOnly, user.caller(), Operation::Create)?;
    let choice = state.choice_service.create(input).await?;
    Ok(Created(choice.into()))
}

async fn list(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<ChoiceResponse>>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Read)?;
    let page = state
        .choice_service
        .list(params.resolve(&state.pagination))
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ChoiceResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Read)?;
    let choice = state.choice_service.get(&id).await?;
    Ok(Json(choice.into()))
}

async fn replace(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateChoiceInput>,
) -> AppResult<Json<ChoiceResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let choice = state.choice_service.update(&id, input.into()).await?;
    Ok(Json(choice.into()))
}

async fn update(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateChoiceInput>,
) -> AppResult<Json<ChoiceResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let choice = state.choice_service.update(&id, input).await?;
    Ok(Json(choice.into()))
}

async fn delete(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Delete)?;
    state.choice_service.delete(&id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/choices/create/", post(create))
        .route("/choices/", get(list))
        .route(
            "/choices/{id}/",
            get(show).put(replace).patch(update).delete(delete),
        )
}
