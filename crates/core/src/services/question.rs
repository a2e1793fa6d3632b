//! Question service.

use std::collections::HashMap;

use sea_orm::Set;
use serde::Deserialize;
use survey_common::{AppResult, IdGenerator};
use survey_db::{
    entities::{choice, question, question::QuestionType},
    repositories::{ChoiceRepository, PollRepository, QuestionRepository},
};
use validator::Validate;

use crate::services::{Page, PageRequest};

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    poll_repo: PollRepository,
    choice_repo: ChoiceRepository,
    id_gen: IdGenerator,
}

/// A question with its choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDetail {
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
}

/// Input for creating (or fully replacing) a question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    pub poll: String,

    #[validate(length(min = 1, max = 4096))]
    pub text: String,

    #[serde(default)]
    pub question_type: QuestionType,
}

/// Input for partially updating a question.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionInput {
    pub poll: Option<String>,

    #[validate(length(min = 1, max = 4096))]
    pub text: Option<String>,

    pub question_type: Option<QuestionType>,
}

impl From<CreateQuestionInput> for UpdateQuestionInput {
    fn from(input: CreateQuestionInput) -> Self {
        Self {
            poll: Some(input.poll),
            text: Some(input.text),
            question_type: Some(input.question_type),
        }
    }
}

/// Pair each question with its choices, keeping the order of `questions`.
pub(crate) fn attach_choices(
    questions: Vec<question::Model>,
    choices: Vec<choice::Model>,
) -> Vec<QuestionDetail> {
    let mut by_question: HashMap<String, Vec<choice::Model>> = HashMap::new();
    for choice in choices {
        by_question
            .entry(choice.question_id.clone())
            .or_default()
            .push(choice);
    }

    questions
        .into_iter()
        .map(|question| QuestionDetail {
            choices: by_question.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect()
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        question_repo: QuestionRepository,
        poll_repo: PollRepository,
        choice_repo: ChoiceRepository,
    ) -> Self {
        Self {
            question_repo,
            poll_repo,
            choice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a question in an existing poll.
    pub async fn create(&self, input: CreateQuestionInput) -> AppResult<QuestionDetail> {
        input.validate()?;
        self.poll_repo.get_by_id(&input.poll).await?;

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(input.poll),
            text: Set(input.text),
            question_type: Set(input.question_type),
        };
        let question = self.question_repo.create(model).await?;

        tracing::info!(question_id = %question.id, poll_id = %question.poll_id, "Question created");

        Ok(QuestionDetail {
            question,
            choices: vec![],
        })
    }

    /// Get a question with its choices.
    pub async fn get(&self, id: &str) -> AppResult<QuestionDetail> {
        let question = self.question_repo.get_by_id(id).await?;
        self.with_choices(question).await
    }

    /// List questions of every poll.
    pub async fn list(&self, page: PageRequest) -> AppResult<Page<QuestionDetail>> {
        let count = self.question_repo.count().await?;
        let questions = self.question_repo.list(page.limit, page.offset).await?;

        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let choices = self.choice_repo.find_by_question_ids(&ids).await?;

        Ok(Page {
            count,
            results: attach_choices(questions, choices),
        })
    }

    /// Update the supplied fields of a question.
    pub async fn update(&self, id: &str, input: UpdateQuestionInput) -> AppResult<QuestionDetail> {
        input.validate()?;

        let question = self.question_repo.get_by_id(id).await?;
        let mut active: question::ActiveModel = question.clone().into();

        if let Some(poll_id) = input.poll
            && poll_id != question.poll_id
        {
            self.poll_repo.get_by_id(&poll_id).await?;
            active.poll_id = Set(poll_id);
        }
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        if let Some(question_type) = input.question_type {
            active.question_type = Set(question_type);
        }

        let question = self.question_repo.update(active).await?;
        self.with_choices(question).await
    }

    /// Delete a question and its choices.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.question_repo.delete(id).await?;
        tracing::info!(question_id = %id, "Question deleted");
        Ok(())
    }

    async fn with_choices(&self, question: question::Model) -> AppResult<QuestionDetail> {
        let choices = self
            .choice_repo
            .find_by_question_ids(std::slice::from_ref(&question.id))
            .await?;
        Ok(QuestionDetail { question, choices })
    }
}
