//! Poll repository.

use std::sync::Arc;

use crate::entities::{Poll, poll};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, prelude::DateTimeWithTimeZone,
};
use survey_common::{AppError, AppResult};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// List polls in creation order. With `active_at`, only polls whose
    /// `[start_date, end_date]` window contains that instant.
    pub async fn list(
        &self,
        active_at: Option<DateTimeWithTimeZone>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<poll::Model>> {
        Self::scoped(active_at)
            .order_by_asc(poll::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count polls matching the same filter as [`Self::list`].
    pub async fn count(&self, active_at: Option<DateTimeWithTimeZone>) -> AppResult<u64> {
        Self::scoped(active_at)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn scoped(active_at: Option<DateTimeWithTimeZone>) -> Select<Poll> {
        let query = Poll::find();
        match active_at {
            Some(now) => query
                .filter(poll::Column::StartDate.lte(now))
                .filter(poll::Column::EndDate.gte(now)),
            None => query,
        }
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "title"))
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_write(&e, "title"))
    }

    /// Delete a poll. Questions, choices and submissions go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Poll::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Poll not found: {id}")));
        }
        Ok(())
    }
}
