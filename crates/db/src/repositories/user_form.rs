//! User form repository.

use std::sync::Arc;

use crate::entities::{
    UserAnswer, UserAnswerChoice, UserForm, user_answer, user_answer_choice, user_form,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};
use survey_common::{AppError, AppResult};

/// A validated submission ready to be written.
pub struct NewSubmission {
    pub form: user_form::ActiveModel,
    pub answers: Vec<NewAnswer>,
}

/// One answer of a [`NewSubmission`] with its choice links.
pub struct NewAnswer {
    pub answer: user_answer::ActiveModel,
    pub choices: Vec<user_answer_choice::ActiveModel>,
}

/// User form repository for database operations.
#[derive(Clone)]
pub struct UserFormRepository {
    db: Arc<DatabaseConnection>,
}

impl UserFormRepository {
    /// Create a new user form repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a session already submitted a form for a poll.
    pub async fn exists_for(&self, session_key: &str, poll_id: &str) -> AppResult<bool> {
        let count = UserForm::find()
            .filter(user_form::Column::SessionKey.eq(session_key))
            .filter(user_form::Column::PollId.eq(poll_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// List forms newest last. With `session_key`, only that session's forms.
    pub async fn list(
        &self,
        session_key: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user_form::Model>> {
        Self::scoped(session_key)
            .order_by_asc(user_form::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count forms matching the same filter as [`Self::list`].
    pub async fn count(&self, session_key: Option<&str>) -> AppResult<u64> {
        Self::scoped(session_key)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn scoped(session_key: Option<&str>) -> Select<UserForm> {
        let query = UserForm::find();
        match session_key {
            Some(key) => query.filter(user_form::Column::SessionKey.eq(key)),
            None => query,
        }
    }

    /// Get an answer by ID, returning error if not found.
    pub async fn get_answer(&self, id: &str) -> AppResult<user_answer::Model> {
        UserAnswer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Answer not found: {id}")))
    }

    /// Answers belonging to any of the given forms.
    pub async fn find_answers(&self, form_ids: &[String]) -> AppResult<Vec<user_answer::Model>> {
        if form_ids.is_empty() {
            return Ok(vec![]);
        }

        UserAnswer::find()
            .filter(user_answer::Column::UserFormId.is_in(form_ids.iter().cloned()))
            .order_by_asc(user_answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Choice links of any of the given answers.
    pub async fn find_answer_choices(
        &self,
        answer_ids: &[String],
    ) -> AppResult<Vec<user_answer_choice::Model>> {
        if answer_ids.is_empty() {
            return Ok(vec![]);
        }

        UserAnswerChoice::find()
            .filter(user_answer_choice::Column::UserAnswerId.is_in(answer_ids.iter().cloned()))
            .order_by_asc(user_answer_choice::Column::ChoiceId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a form, its answers and their choice links in one transaction.
    ///
    /// The unique index on `(session_key, poll_id)` makes this an
    /// insert-if-absent: a duplicate fails with [`AppError::Uniqueness`] on
    /// `poll` and nothing is written.
    pub async fn create_submission(&self, submission: NewSubmission) -> AppResult<user_form::Model> {
        let txn = self.db.begin().await?;

        let form = submission
            .form
            .insert(&txn)
            .await
            .map_err(|e| AppError::from_db_write(&e, "poll"))?;

        for NewAnswer { answer, choices } in submission.answers {
            UserAnswer::insert(answer).exec_without_returning(&txn).await?;

            if !choices.is_empty() {
                UserAnswerChoice::insert_many(choices)
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        txn.commit().await?;
        Ok(form)
    }

    /// Replace the selected choices of an existing answer.
    pub async fn replace_answer_choices(
        &self,
        answer_id: &str,
        choices: Vec<user_answer_choice::ActiveModel>,
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        UserAnswerChoice::delete_many()
            .filter(user_answer_choice::Column::UserAnswerId.eq(answer_id))
            .exec(&txn)
            .await?;

        if !choices.is_empty() {
            UserAnswerChoice::insert_many(choices)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_form(id: &str, session_key: &str) -> user_form::Model {
        user_form::Model {
            id: id.to_string(),
            session_key: session_key.to_string(),
            poll_id: "p1".to_string(),
            phone_number: None,
            email: None,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_exists_for_true_when_counted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let repo = UserFormRepository::new(db);
        assert!(repo.exists_for("s1", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_for_false_when_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let repo = UserFormRepository::new(db);
        assert!(!repo.exists_for("s1", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_scoped_to_session() {
        let form = create_test_form("f1", "s1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[form.clone()]])
                .into_connection(),
        );

        let repo = UserFormRepository::new(Arc::clone(&db));
        let forms = repo.list(Some("s1"), 20, 0).await.unwrap();
        assert_eq!(forms, vec![form]);
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("session_key"));
    }

    #[tokio::test]
    async fn test_create_submission_writes_form_answers_and_links() {
        let form = create_test_form("f1", "s1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // INSERT ... RETURNING for the form
                .append_query_results([[form.clone()]])
                // answer insert, then its choice links
                .append_exec_results([exec_ok(1), exec_ok(2)])
                .into_connection(),
        );

        let submission = NewSubmission {
            form: user_form::ActiveModel {
                id: Set("f1".to_string()),
                session_key: Set("s1".to_string()),
                poll_id: Set("p1".to_string()),
                phone_number: Set(None),
                email: Set(None),
                created_at: Set(form.created_at),
            },
            answers: vec![NewAnswer {
                answer: user_answer::ActiveModel {
                    id: Set("a1".to_string()),
                    user_form_id: Set("f1".to_string()),
                    question_id: Set("q1".to_string()),
                    custom_answer: Set(None),
                },
                choices: vec![
                    user_answer_choice::ActiveModel {
                        user_answer_id: Set("a1".to_string()),
                        choice_id: Set("c1".to_string()),
                    },
                    user_answer_choice::ActiveModel {
                        user_answer_id: Set("a1".to_string()),
                        choice_id: Set("c2".to_string()),
                    },
                ],
            }],
        };

        let repo = UserFormRepository::new(db);
        let stored = repo.create_submission(submission).await.unwrap();

        assert_eq!(stored, form);
    }

    #[tokio::test]
    async fn test_create_submission_propagates_failed_answer_insert() {
        let form = create_test_form("f1", "s1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[form.clone()]])
                // no exec results queued: the answer insert fails
                .into_connection(),
        );

        let submission = NewSubmission {
            form: user_form::ActiveModel {
                id: Set("f1".to_string()),
                session_key: Set("s1".to_string()),
                poll_id: Set("p1".to_string()),
                phone_number: Set(None),
                email: Set(None),
                created_at: Set(form.created_at),
            },
            answers: vec![NewAnswer {
                answer: user_answer::ActiveModel {
                    id: Set("a1".to_string()),
                    user_form_id: Set("f1".to_string()),
                    question_id: Set("q1".to_string()),
                    custom_answer: Set(Some("hello".to_string())),
                },
                choices: vec![],
            }],
        };

        let repo = UserFormRepository::new(db);
        let result = repo.create_submission(submission).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
