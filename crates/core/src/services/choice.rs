//! Choice service.

use sea_orm::Set;
use serde::Deserialize;
use survey_common::{AppResult, IdGenerator};
use survey_db::{
    entities::choice,
    repositories::{ChoiceRepository, QuestionRepository},
};
use validator::Validate;

use crate::services::{Page, PageRequest};

/// Choice service for business logic.
#[derive(Clone)]
pub struct ChoiceService {
    choice_repo: ChoiceRepository,
    question_repo: QuestionRepository,
    id_gen: IdGenerator,
}

/// Input for creating (or fully replacing) a choice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChoiceInput {
    pub question: String,

    #[validate(length(min = 1, max = 4096))]
    pub title: String,
}

/// Input for partially updating a choice.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateChoiceInput {
    pub question: Option<String>,

    #[validate(length(min = 1, max = 4096))]
    pub title: Option<String>,
}

impl From<CreateChoiceInput> for UpdateChoiceInput {
    fn from(input: CreateChoiceInput) -> Self {
        Self {
            question: Some(input.question),
            title: Some(input.title),
        }
    }
}

impl ChoiceService {
    /// Create a new choice service.
    #[must_use]
    pub const fn new(choice_repo: ChoiceRepository, question_repo: QuestionRepository) -> Self {
        Self {
            choice_repo,
            question_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a choice for an existing question.
    pub async fn create(&self, input: CreateChoiceInput) -> AppResult<choice::Model> {
        input.validate()?;
        self.question_repo.get_by_id(&input.question).await?;

        let model = choice::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(input.question),
            title: Set(input.title),
        };
        self.choice_repo.create(model).await
    }

    /// Get a choice by ID.
    pub async fn get(&self, id: &str) -> AppResult<choice::Model> {
        self.choice_repo.get_by_id(id).await
    }

    /// List choices of every question.
    pub async fn list(&self, page: PageRequest) -> AppResult<Page<choice::Model>> {
        let count = self.choice_repo.count().await?;
        let results = self.choice_repo.list(page.limit, page.offset).await?;
        Ok(Page { count, results })
    }

    /// Update the supplied fields of a choice.
    pub async fn update(&self, id: &str, input: UpdateChoiceInput) -> AppResult<choice::Model> {
        input.validate()?;

        let choice = self.choice_repo.get_by_id(id).await?;
        let mut active: choice::ActiveModel = choice.clone().into();

        if let Some(question_id) = input.question
            && question_id != choice.question_id
        {
            self.question_repo.get_by_id(&question_id).await?;
            active.question_id = Set(question_id);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }

        self.choice_repo.update(active).await
    }

    /// Delete a choice.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.choice_repo.delete(id).await
    }
}
