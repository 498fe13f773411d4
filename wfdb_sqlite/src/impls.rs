use wfcore::platform::{
    ConnectorOption,
    PlatformUrl,
};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::SqliteBackend;

impl PlatformUrl for SqliteBackend {
    fn url(&self) -> &str {
        self.url.as_ref()
    }
}

impl SqliteBackend {
    pub async fn connect(opts: ConnectorOption) -> Result<SqliteBackend, sqlx::Error> {
        if opts.auto_create_db && !Sqlite::database_exists(&opts.url).await.unwrap_or(false) {
            log::warn!("sqlite database {} does not exist; creating...", &opts.url);
            Sqlite::create_database(&opts.url).await?
        }

        let pool = SqlitePool::connect(&opts.url).await?;
        Ok(SqliteBackend {
            pool: Arc::new(pool),
            url: opts.url,
        })
    }

    pub async fn migrate(self) -> Result<Self, sqlx::Error> {
        sqlx::migrate!("migrations/workflow").run(&*self.pool).await?;
        Ok(self)
    }

    /// Connects and runs the migrations.
    pub async fn from_url(url: &str) -> Result<Self, sqlx::Error> {
        Self::connect(url.into()).await?
            .migrate()
            .await
    }
}

mod content;
mod field;
mod history;
mod rule;
mod schedule;
mod state;
mod workflow;

mod default_impl {
    use wfcore::platform::DefaultWFPlatform;
    use crate::SqliteBackend;

    impl DefaultWFPlatform for SqliteBackend {}
}

#[cfg(test)]
pub(crate) mod tests {
    use wfcore::{
        platform::{
            ConnectorOption,
            PlatformUrl,
            WFPlatform,
        },
        workflow::Workflow,
    };
    use crate::SqliteBackend;

    pub(crate) async fn backend() -> anyhow::Result<SqliteBackend> {
        Ok(SqliteBackend::from_url("sqlite::memory:").await?)
    }

    /// A backend with the `editorial` workflow and its states in place.
    pub(crate) async fn editorial() -> anyhow::Result<SqliteBackend> {
        use wfcore::state::State;
        let backend = backend().await?;
        let platform: &dyn WFPlatform = &backend;
        platform.add_workflow(&Workflow::new("editorial", "Editorial")).await?;
        for state in [
            State::creation("editorial"),
            State::new("editorial", "editorial_draft", "Draft").weight(1),
            State::new("editorial", "editorial_review", "Review").weight(2),
            State::new("editorial", "editorial_published", "Published").weight(3),
        ] {
            platform.insert_state(&state).await?;
        }
        Ok(backend)
    }

    #[async_std::test]
    async fn connect_file() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let url = format!("sqlite://{}/workflow.db", tempdir.path().display());
        let backend = SqliteBackend::connect(
            ConnectorOption::from(&url).auto_create_db(true)
        ).await?
            .migrate()
            .await?;
        assert_eq!(backend.url(), url);
        let platform: &dyn WFPlatform = &backend;
        platform.add_workflow(&Workflow::new("editorial", "Editorial")).await?;
        assert_eq!(platform.list_workflows().await?.len(), 1);
        Ok(())
    }

    #[async_std::test]
    async fn connect_missing() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let url = format!("sqlite://{}/missing.db", tempdir.path().display());
        assert!(SqliteBackend::connect(url.into()).await.is_err());
        Ok(())
    }
}
