//! Question endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use survey_common::AppResult;
use survey_core::{
    CreateQuestionInput, Operation, Page, Policy, UpdateQuestionInput, authorize,
};

use crate::{
    extractors::{MaybeAuthUser, PageParams},
    middleware::AppState,
    response::{Created, QuestionResponse, no_content},
};

async fn create(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<Created<QuestionResponse>> {
    authorize(Policy::AdminOnly, user.caller(), Operation::Create)?;
    let question = state.question_service.create(input).await?;
    Ok(Created(question.into()))
}

async fn list(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<QuestionResponse>>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Read)?;
    let page = state
        .question_service
        .list(params.resolve(&state.pagination))
        .await?;
    Ok(Json(page.map(Into::into)))
}

async fn show(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<QuestionResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Read)?;
    let question = state.question_service.get(&id).await?;
    Ok(Json(question.into()))
}

async fn replace(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<Json<QuestionResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let question = state.question_service.update(&id, input.into()).await?;
    Ok(Json(question.into()))
}

async fn update(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateQuestionInput>,
) -> AppResult<Json<QuestionResponse>> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Update)?;
    let question = state.question_service.update(&id, input).await?;
    Ok(Json(question.into()))
}

async fn delete(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authorize(Policy::AdminOrReadOnly, user.caller(), Operation::Delete)?;
    state.question_service.delete(&id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions/create/", post(create))
        .route("/questions/", get(list))
        .route(
            "/questions/{id}/",
            get(show).put(replace).patch(update).delete(delete),
        )
}
