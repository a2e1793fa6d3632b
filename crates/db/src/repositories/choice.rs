//! Choice repository.

use std::sync::Arc;

use crate::entities::{Choice, choice};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use survey_common::{AppError, AppResult};

/// Choice repository for database operations.
#[derive(Clone)]
pub struct ChoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl ChoiceRepository {
    /// Create a new choice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a choice by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<choice::Model>> {
        Choice::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a choice by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<choice::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Choice not found: {id}")))
    }

    /// Find choices by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<choice::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Choice::find()
            .filter(choice::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all choices of the given questions.
    pub async fn find_by_question_ids(
        &self,
        question_ids: &[String],
    ) -> AppResult<Vec<choice::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        Choice::find()
            .filter(choice::Column::QuestionId.is_in(question_ids.iter().cloned()))
            .order_by_asc(choice::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List choices of every question in creation order.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<choice::Model>> {
        Choice::find()
            .order_by_asc(choice::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all choices.
    pub async fn count(&self) -> AppResult<u64> {
        Choice::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new choice.
    pub async fn create(&self, model: choice::ActiveModel) -> AppResult<choice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "title"))
    }

    /// Update a choice.
    pub async fn update(&self, model: choice::ActiveModel) -> AppResult<choice::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "title"))
    }

    /// Delete a choice; answers that selected it lose the selection.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Choice::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Choice not found: {id}")));
        }
        Ok(())
    }
}
