//! Poll service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::Deserialize;
use survey_common::{AppError, AppResult, IdGenerator};
use survey_db::{
    entities::poll,
    repositories::{ChoiceRepository, PollRepository, QuestionRepository},
};
use validator::Validate;

use crate::access::PollVisibility;
use crate::services::question::{QuestionDetail, attach_choices};
use crate::services::{Page, PageRequest};

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    id_gen: IdGenerator,
}

/// A poll with its questions and their choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDetail {
    pub poll: poll::Model,
    pub questions: Vec<QuestionDetail>,
}

/// Input for creating (or fully replacing) a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    #[validate(length(min = 1, max = 4096))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 4096))]
    pub description: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Input for partially updating a poll.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollInput {
    #[validate(length(min = 1, max = 4096))]
    pub title: Option<String>,

    #[validate(length(max = 4096))]
    pub description: Option<String>,

    /// Accepted only when equal to the stored value.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<CreatePollInput> for UpdatePollInput {
    fn from(input: CreatePollInput) -> Self {
        Self {
            title: Some(input.title),
            description: Some(input.description),
            start_date: Some(input.start_date),
            end_date: Some(input.end_date),
        }
    }
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        question_repo: QuestionRepository,
        choice_repo: ChoiceRepository,
    ) -> Self {
        Self {
            poll_repo,
            question_repo,
            choice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll.
    pub async fn create(&self, input: CreatePollInput) -> AppResult<PollDetail> {
        input.validate()?;

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            start_date: Set(input.start_date.into()),
            end_date: Set(input.end_date.into()),
            created_at: Set(Utc::now().into()),
        };
        let poll = self.poll_repo.create(model).await?;

        tracing::info!(poll_id = %poll.id, title = %poll.title, "Poll created");

        Ok(PollDetail {
            poll,
            questions: vec![],
        })
    }

    /// Get a poll with its questions.
    pub async fn get(&self, id: &str) -> AppResult<PollDetail> {
        let poll = self.poll_repo.get_by_id(id).await?;
        self.get_detail(poll).await
    }

    /// List the polls visible under `visibility`.
    pub async fn list(
        &self,
        visibility: PollVisibility,
        page: PageRequest,
    ) -> AppResult<Page<PollDetail>> {
        let active_at = visibility.active_at().map(Into::into);

        let count = self.poll_repo.count(active_at).await?;
        let polls = self
            .poll_repo
            .list(active_at, page.limit, page.offset)
            .await?;

        Ok(Page {
            count,
            results: self.with_questions(polls).await?,
        })
    }

    /// Update the supplied fields of a poll. The start date cannot change.
    pub async fn update(&self, id: &str, input: UpdatePollInput) -> AppResult<PollDetail> {
        input.validate()?;

        let poll = self.poll_repo.get_by_id(id).await?;

        if let Some(start_date) = input.start_date
            && start_date != poll.start_date
        {
            return Err(AppError::invalid(
                "startDate",
                "Start date cannot be changed once the poll is created",
            ));
        }

        let mut active: poll::ActiveModel = poll.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date.into());
        }

        let poll = self.poll_repo.update(active).await?;
        self.get_detail(poll).await
    }

    /// Delete a poll with everything attached to it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.poll_repo.delete(id).await?;
        tracing::info!(poll_id = %id, "Poll deleted");
        Ok(())
    }

    async fn get_detail(&self, poll: poll::Model) -> AppResult<PollDetail> {
        let id = poll.id.clone();
        self.with_questions(vec![poll])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    async fn with_questions(&self, polls: Vec<poll::Model>) -> AppResult<Vec<PollDetail>> {
        let poll_ids: Vec<String> = polls.iter().map(|p| p.id.clone()).collect();
        let questions = self.question_repo.find_by_poll_ids(&poll_ids).await?;

        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let choices = self.choice_repo.find_by_question_ids(&question_ids).await?;

        let mut by_poll: HashMap<String, Vec<QuestionDetail>> = HashMap::new();
        for detail in attach_choices(questions, choices) {
            by_poll
                .entry(detail.question.poll_id.clone())
                .or_default()
                .push(detail);
        }

        Ok(polls
            .into_iter()
            .map(|poll| PollDetail {
                questions: by_poll.remove(&poll.id).unwrap_or_default(),
                poll,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use survey_db::entities::{choice, question, question::QuestionType};

    fn poll(id: &str, start: DateTime<Utc>) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            title: format!("Poll {id}"),
            description: String::new(),
            start_date: start.into(),
            end_date: (start + Duration::days(7)).into(),
            created_at: start.into(),
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        poll_db: Arc<DatabaseConnection>,
        question_db: Arc<DatabaseConnection>,
        choice_db: Arc<DatabaseConnection>,
    ) -> PollService {
        PollService::new(
            PollRepository::new(poll_db),
            QuestionRepository::new(question_db),
            ChoiceRepository::new(choice_db),
        )
    }

    #[tokio::test]
    async fn test_update_rejects_changed_start_date() {
        let start = Utc::now();
        let poll_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll("p1", start)]])
                .into_connection(),
        );

        let service = service(poll_db, empty_db(), empty_db());
        let result = service
            .update(
                "p1",
                UpdatePollInput {
                    start_date: Some(start + Duration::hours(1)),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation(fields)) => assert!(fields.get("startDate").is_some()),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_accepts_unchanged_start_date() {
        let start = Utc::now();
        let mut renamed = poll("p1", start);
        renamed.title = "Renamed".to_string();

        let poll_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll("p1", start)]])
                .append_query_results([[renamed.clone()]])
                .into_connection(),
        );
        let question_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let service = service(poll_db, question_db, empty_db());
        let detail = service
            .update(
                "p1",
                UpdatePollInput {
                    title: Some("Renamed".to_string()),
                    start_date: Some(start),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.poll, renamed);
        assert!(detail.questions.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let service = service(empty_db(), empty_db(), empty_db());
        let now = Utc::now();
        let result = service
            .create(CreatePollInput {
                title: String::new(),
                description: String::new(),
                start_date: now,
                end_date: now,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_nests_questions_under_their_poll() {
        let now = Utc::now();
        let poll_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([[poll("p1", now), poll("p2", now)]])
                .into_connection(),
        );
        let question_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question::Model {
                    id: "q1".to_string(),
                    poll_id: "p2".to_string(),
                    text: "Pick one".to_string(),
                    question_type: QuestionType::Single,
                }]])
                .into_connection(),
        );
        let choice_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[choice::Model {
                    id: "c1".to_string(),
                    question_id: "q1".to_string(),
                    title: "Pizza".to_string(),
                }]])
                .into_connection(),
        );

        let service = service(poll_db, question_db, choice_db);
        let page = service
            .list(
                PollVisibility::All,
                PageRequest {
                    limit: 20,
                    offset: 0,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        assert!(page.results[0].questions.is_empty());
        assert_eq!(page.results[1].questions.len(), 1);
        assert_eq!(page.results[1].questions[0].choices[0].title, "Pizza");
    }
}
