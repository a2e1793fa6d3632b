//! User service: staff accounts that manage polls.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use survey_common::{AppError, AppResult, IdGenerator};
use survey_db::{entities::user, repositories::UserRepository};
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Credentials for signing in.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Check credentials and return the user with a bearer token.
    pub async fn authenticate(&self, input: SigninInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await
    }

    /// Resolve a bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_token(token).await
    }

    /// Make sure an administrator with this username exists.
    ///
    /// An existing user keeps their password and is promoted if needed.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(username).await? {
            if existing.is_admin {
                return Ok(existing);
            }
            let mut active: user::ActiveModel = existing.into();
            active.is_admin = Set(true);
            let user = self.user_repo.update(active).await?;
            tracing::info!(username = %user.username, "Promoted user to administrator");
            return Ok(user);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(password)?),
            token: Set(Some(self.id_gen.generate_token())),
            is_admin: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let user = self.user_repo.create(model).await?;

        tracing::info!(username = %user.username, "Created administrator");
        Ok(user)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(username: &str, password: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            token: Some("test_token".to_string()),
            is_admin,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[tokio::test]
    async fn test_authenticate_with_correct_password() {
        let user = create_test_user("admin", "hunter22", true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let signed_in = service
            .authenticate(SigninInput {
                username: "admin".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(signed_in.token.as_deref(), Some("test_token"));
    }

    #[tokio::test]
    async fn test_authenticate_with_wrong_password() {
        let user = create_test_user("admin", "hunter22", true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .authenticate(SigninInput {
                username: "admin".to_string(),
                password: "nope".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .authenticate(SigninInput {
                username: "ghost".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_ensure_admin_keeps_existing_admin() {
        let user = create_test_user("admin", "hunter22", true);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let ensured = service.ensure_admin("admin", "other").await.unwrap();

        assert_eq!(ensured, user);
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing_user() {
        let user = create_test_user("staff", "hunter22", false);
        let mut promoted = user.clone();
        promoted.is_admin = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[promoted.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let ensured = service.ensure_admin("staff", "ignored").await.unwrap();

        assert!(ensured.is_admin);
    }
}
