use std::{
    error::Error,
    fs,
    sync::Arc,
};
use clap::{ArgAction, Parser};
use wfcore::platform::ConnectorOption;
use wfdb_sqlite::SqliteBackend;
use wfrbac::Builder as RbacBuilder;

use super::Platform;

#[derive(Clone, Debug, Default, Parser)]
pub struct Builder {
    #[clap(
        long,
        value_name = "WF_AUTO_CREATE_DB",
        env = "WF_AUTO_CREATE_DB",
        action = ArgAction::Set,
        default_value_t = true,
        default_missing_value = "true",
    )]
    pub wf_auto_create_db: bool,
    #[clap(long, value_name = "WF_DB_URL", env = "WF_DB_URL")]
    pub wf_db_url: String,
    /// File with the role and capability grants, one per line.
    #[clap(long, value_name = "WF_GRANTS", env = "WF_GRANTS")]
    pub wf_grants: Option<String>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wf_auto_create_db(mut self, value: bool) -> Self {
        self.wf_auto_create_db = value;
        self
    }

    pub fn wf_db_url(mut self, value: String) -> Self {
        self.wf_db_url = value;
        self
    }

    pub fn wf_grants(mut self, value: Option<String>) -> Self {
        self.wf_grants = value;
        self
    }

    pub async fn build(self) -> Result<Platform, Box<dyn Error + Send + Sync>> {
        let backend = Arc::new(
            SqliteBackend::connect(
                ConnectorOption::from(&self.wf_db_url)
                    .auto_create_db(self.wf_auto_create_db)
            )
                .await?
                .migrate()
                .await?
        );
        let rbac = match &self.wf_grants {
            Some(path) => RbacBuilder::new()
                .grants(&fs::read_to_string(path)?)?,
            None => {
                log::info!("no grants provided; agents will only hold their implicit roles");
                RbacBuilder::new()
            }
        };
        Ok(Platform::new(
            backend.clone(),
            backend,
            rbac.build().await?.into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use wfcore::{
        ac::{
            Agent,
            traits::bypass_capability,
        },
        workflow::WorkflowSettings,
    };
    use super::Builder;

    #[async_std::test]
    async fn build_from_files() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let grants = tempdir.path().join("grants.txt");
        fs::write(&grants, "u:7, admin\nadmin, bypass editorial workflow_transition access\n")?;

        let platform = Builder::new()
            .wf_auto_create_db(true)
            .wf_db_url(format!("sqlite://{}/workflow.db", tempdir.path().display()))
            .wf_grants(Some(grants.display().to_string()))
            .build()
            .await
            .map_err(anyhow::Error::from_boxed)?;
        assert!(platform.resolver.roles(&Agent::User(7)).contains("admin"));
        assert!(platform.resolver.has_capability(
            &Agent::User(7),
            &bypass_capability("editorial"),
        ));

        platform.create_workflow("editorial", "Editorial", WorkflowSettings::default(), false).await?;
        assert_eq!(platform.list_workflows().await?.len(), 1);
        Ok(())
    }

    #[async_std::test]
    async fn build_without_db() -> anyhow::Result<()> {
        let tempdir = tempfile::tempdir()?;
        let result = Builder::new()
            .wf_auto_create_db(false)
            .wf_db_url(format!("sqlite://{}/missing.db", tempdir.path().display()))
            .build()
            .await;
        assert!(result.is_err());
        Ok(())
    }
}
