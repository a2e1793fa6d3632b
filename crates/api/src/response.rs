//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use survey_core::{AnswerRecord, PollDetail, QuestionDetail, UserFormDetail};
use survey_db::entities::{choice, question::QuestionType};

/// A `201 Created` JSON response.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Poll response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub questions: Vec<QuestionResponse>,
}

impl From<PollDetail> for PollResponse {
    fn from(detail: PollDetail) -> Self {
        let PollDetail { poll, questions } = detail;
        Self {
            id: poll.id,
            title: poll.title,
            description: poll.description,
            start_date: poll.start_date.to_rfc3339(),
            end_date: poll.end_date.to_rfc3339(),
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Question response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub poll: String,
    pub text: String,
    pub question_type: QuestionType,
    pub choices: Vec<ChoiceResponse>,
}

impl From<QuestionDetail> for QuestionResponse {
    fn from(detail: QuestionDetail) -> Self {
        let QuestionDetail { question, choices } = detail;
        Self {
            id: question.id,
            poll: question.poll_id,
            text: question.text,
            question_type: question.question_type,
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

/// Choice response.
#[derive(Debug, Serialize)]
pub struct ChoiceResponse {
    pub id: String,
    pub question: String,
    pub title: String,
}

impl From<choice::Model> for ChoiceResponse {
    fn from(choice: choice::Model) -> Self {
        Self {
            id: choice.id,
            question: choice.question_id,
            title: choice.title,
        }
    }
}

/// User form response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFormResponse {
    pub id: String,
    pub poll: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
    pub answers: Vec<UserAnswerResponse>,
}

impl From<UserFormDetail> for UserFormResponse {
    fn from(detail: UserFormDetail) -> Self {
        let UserFormDetail { form, answers } = detail;
        Self {
            id: form.id,
            poll: form.poll_id,
            phone_number: form.phone_number,
            email: form.email,
            created_at: form.created_at.to_rfc3339(),
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

/// User answer response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswerResponse {
    pub id: String,
    pub question: String,
    pub choices: Vec<String>,
    pub custom_answer: Option<String>,
}

impl From<AnswerRecord> for UserAnswerResponse {
    fn from(answer: AnswerRecord) -> Self {
        Self {
            id: answer.id,
            question: answer.question_id,
            choices: answer.choices,
            custom_answer: answer.custom_answer,
        }
    }
}
