//! Question repository.

use std::sync::Arc;

use crate::entities::{Question, question};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use survey_common::{AppError, AppResult};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))
    }

    /// Find questions by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<question::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Question::find()
            .filter(question::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all questions belonging to any of the given polls.
    pub async fn find_by_poll_ids(&self, poll_ids: &[String]) -> AppResult<Vec<question::Model>> {
        if poll_ids.is_empty() {
            return Ok(vec![]);
        }

        Question::find()
            .filter(question::Column::PollId.is_in(poll_ids.iter().cloned()))
            .order_by_asc(question::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List questions of every poll in creation order.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<question::Model>> {
        Question::find()
            .order_by_asc(question::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all questions.
    pub async fn count(&self) -> AppResult<u64> {
        Question::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "text"))
    }

    /// Update a question.
    pub async fn update(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "text"))
    }

    /// Delete a question and, by cascade, its choices and answers.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Question::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Question not found: {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::question::QuestionType;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_question(id: &str, poll_id: &str, kind: QuestionType) -> question::Model {
        question::Model {
            id: id.to_string(),
            poll_id: poll_id.to_string(),
            text: format!("Question {id}"),
            question_type: kind,
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No results queued: a query would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = QuestionRepository::new(db);
        let found = repo.find_by_ids(&[]).await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_poll_ids_returns_questions() {
        let q1 = create_test_question("q1", "p1", QuestionType::Single);
        let q2 = create_test_question("q2", "p1", QuestionType::Custom);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[q1, q2]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let found = repo.find_by_poll_ids(&["p1".to_string()]).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[1].question_type, QuestionType::Custom);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
