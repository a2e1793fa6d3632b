//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, UserForm, session, user_form};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    prelude::DateTimeWithTimeZone, sea_query::Query,
};
use survey_common::{AppError, AppResult};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session that has not expired at `now`.
    pub async fn find_valid(
        &self,
        session_key: &str,
        now: DateTimeWithTimeZone,
    ) -> AppResult<Option<session::Model>> {
        Session::find_by_id(session_key)
            .filter(session::Column::ExpiresAt.gt(now))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete sessions expired at `now`, returning how many were removed.
    ///
    /// Sessions that submitted a form are kept: submissions outlive the
    /// session that made them and only go away with their poll.
    pub async fn delete_expired(&self, now: DateTimeWithTimeZone) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .filter(
                session::Column::SessionKey.not_in_subquery(
                    Query::select()
                        .column(user_form::Column::SessionKey)
                        .from(UserForm)
                        .to_owned(),
                ),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_valid_returns_session() {
        let now = Utc::now();
        let session = session::Model {
            session_key: "abc".to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::days(14)).into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session.clone()]])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        let found = repo.find_valid("abc", now.into()).await.unwrap();

        assert_eq!(found, Some(session));
    }

    #[tokio::test]
    async fn test_delete_expired_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 4,
                }])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        assert_eq!(repo.delete_expired(Utc::now().into()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete_expired_skips_sessions_with_forms() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = SessionRepository::new(Arc::clone(&db));
        repo.delete_expired(Utc::now().into()).await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"DELETE FROM "session""#));
        assert!(sql.contains(r#""expires_at" <="#));
        assert!(sql.contains(r#""session_key" NOT IN (SELECT "session_key" FROM "user_form")"#));
    }
}
