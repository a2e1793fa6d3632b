//! Throwaway `PostgreSQL` databases for integration tests.
//!
//! Each [`TestDatabase`] is a freshly created and migrated database with a
//! random name, so integration tests can run in parallel against one server.

use std::sync::Arc;

use crate::migrations::Migrator;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// Server the test databases are created on, read from `TEST_DB_*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestServer {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl TestServer {
    /// Read the server location from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str, fallback: &str| {
            std::env::var(name).unwrap_or_else(|_| fallback.to_string())
        };
        Self {
            host: var("TEST_DB_HOST", "localhost"),
            port: var("TEST_DB_PORT", "5433").parse().unwrap_or(5433),
            username: var("TEST_DB_USER", "survey_test"),
            password: var("TEST_DB_PASSWORD", "survey_test"),
        }
    }

    /// Connection URL for `database` on this server.
    #[must_use]
    pub fn url(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{database}",
            self.username, self.password, self.host, self.port
        )
    }

    async fn execute(&self, sql: String) -> Result<(), DbErr> {
        let admin = Database::connect(&self.url("postgres")).await?;
        let result = admin
            .execute(Statement::from_string(DatabaseBackend::Postgres, sql))
            .await;
        admin.close().await?;
        result.map(|_| ())
    }
}

/// A migrated database owned by one test.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
    server: TestServer,
    name: String,
}

impl TestDatabase {
    /// Create and migrate a database named `survey_test_<random>`.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let server = TestServer::from_env();
        let name = format!("survey_test_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);

        server.execute(format!("CREATE DATABASE \"{name}\"")).await?;

        let conn = Database::connect(&server.url(&name)).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %name, "Created test database");
        Ok(Self {
            conn: Arc::new(conn),
            server,
            name,
        })
    }

    /// Shared handle to the database, ready to hand to repositories.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Drop the database. Open connections to it are terminated first.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        let Self { conn, server, name } = self;
        if let Ok(conn) = Arc::try_unwrap(conn) {
            conn.close().await?;
        }

        server
            .execute(format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
            .await?;

        info!(database = %name, "Dropped test database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url_targets_named_database() {
        let server = TestServer {
            host: "db".to_string(),
            port: 5433,
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(server.url("survey_test_1"), "postgres://user:pass@db:5433/survey_test_1");
        assert_eq!(server.url("postgres"), "postgres://user:pass@db:5433/postgres");
    }
}
