use async_trait::async_trait;

use taxsaver_core::db::{DbConfig, RepositoryFactory};
use taxsaver_core::{PlannerRepository, RepositoryError};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`taxsaver_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use taxsaver_core::db::RepositoryRegistry;
/// use taxsaver_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// The connection string is an sqlx SQLite URL:
    /// * `sqlite:taxsaver.db?mode=rwc` opens a file, created if missing.
    /// * `sqlite::memory:` opens an ephemeral in-memory database (tests).
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PlannerRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use taxsaver_core::db::{DbConfig, RepositoryFactory};

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    /// Full round-trip: factory → in-memory repository with migrations run.
    #[tokio::test]
    async fn creates_in_memory_repository() {
        let config = DbConfig::default();

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(
            result.is_ok(),
            "failed to create in-memory repository: {:#?}",
            result.err()
        );
    }
}
