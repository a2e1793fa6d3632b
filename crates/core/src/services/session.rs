//! Anonymous session service.

use chrono::{Duration, Utc};
use sea_orm::Set;
use survey_common::{AppError, AppResult, IdGenerator, SessionKey, config::SessionConfig};
use survey_db::{entities::session, repositories::SessionRepository};

/// Resolves and provisions the anonymous sessions that own submissions.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    id_gen: IdGenerator,
    ttl: Duration,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(session_repo: SessionRepository, config: &SessionConfig) -> Self {
        Self {
            session_repo,
            id_gen: IdGenerator::new(),
            ttl: Duration::days(config.ttl_days),
        }
    }

    /// How long a new session lives.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a session key, ignoring unknown or expired ones.
    pub async fn resolve(&self, key: &SessionKey) -> AppResult<Option<SessionKey>> {
        let found = self
            .session_repo
            .find_valid(key.as_str(), Utc::now().into())
            .await?;
        Ok(found.and_then(|s| SessionKey::new(s.session_key)))
    }

    /// Create a fresh session.
    pub async fn provision(&self) -> AppResult<SessionKey> {
        let now = Utc::now();
        let key = self.id_gen.generate_session_key();

        let model = session::ActiveModel {
            session_key: Set(key.clone()),
            created_at: Set(now.into()),
            expires_at: Set((now + self.ttl).into()),
        };
        self.session_repo.create(model).await?;

        tracing::debug!("Provisioned anonymous session");

        SessionKey::new(key)
            .ok_or_else(|| AppError::Internal("Generated an empty session key".to_string()))
    }

    /// Resolve `key` or provision a new session. The flag is true when the
    /// session was created by this call.
    pub async fn resolve_or_provision(
        &self,
        key: Option<&SessionKey>,
    ) -> AppResult<(SessionKey, bool)> {
        if let Some(key) = key
            && let Some(existing) = self.resolve(key).await?
        {
            return Ok((existing, false));
        }
        Ok((self.provision().await?, true))
    }

    /// Remove expired sessions that never submitted a form.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let removed = self.session_repo.delete_expired(Utc::now().into()).await?;
        if removed > 0 {
            tracing::info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn config() -> SessionConfig {
        SessionConfig {
            cookie_name: "sessionid".to_string(),
            ttl_days: 14,
            secure_cookie: false,
        }
    }

    fn stored(key: &str) -> session::Model {
        let now = Utc::now();
        session::Model {
            session_key: key.to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::days(14)).into(),
        }
    }

    #[tokio::test]
    async fn test_resolve_known_session() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored("abc")]])
                .into_connection(),
        );

        let service = SessionService::new(SessionRepository::new(db), &config());
        let key = SessionKey::new("abc").unwrap();

        assert_eq!(service.resolve(&key).await.unwrap(), Some(key));
    }

    #[tokio::test]
    async fn test_unknown_session_is_replaced() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<session::Model>::new()])
                .append_query_results([[stored("fresh")]])
                .into_connection(),
        );

        let service = SessionService::new(SessionRepository::new(db), &config());
        let stale = SessionKey::new("stale").unwrap();
        let (key, created) = service.resolve_or_provision(Some(&stale)).await.unwrap();

        assert!(created);
        assert_ne!(key, stale);
        assert_eq!(key.as_str().len(), 32);
    }

    #[test]
    fn test_ttl_follows_config() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = SessionService::new(SessionRepository::new(db), &config());
        assert_eq!(service.ttl(), Duration::days(14));
    }
}
