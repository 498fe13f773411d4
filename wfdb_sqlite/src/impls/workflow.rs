use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::SqliteRow,
};
use wfcore::{
    error::BackendError,
    workflow::{
        Workflow,
        WorkflowSettings,
        traits::WorkflowBackend,
    },
};

use crate::SqliteBackend;

fn to_workflow(row: SqliteRow) -> Result<Workflow, sqlx::Error> {
    let settings: String = row.try_get("settings")?;
    Ok(Workflow {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        settings: serde_json::from_str(&settings)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

async fn add_workflow_sqlite(
    sqlite: &SqliteBackend,
    workflow: &Workflow,
) -> Result<(), BackendError> {
    let settings = serde_json::to_string(&workflow.settings)?;
    sqlx::query(
        "
INSERT INTO workflow (
    id,
    label,
    settings
)
VALUES ( ?1, ?2, ?3 )\
        ",
    )
        .bind(&workflow.id)
        .bind(&workflow.label)
        .bind(settings)
        .execute(&*sqlite.pool)
        .await?;
    Ok(())
}

async fn get_workflow_sqlite(
    sqlite: &SqliteBackend,
    id: &str,
) -> Result<Option<Workflow>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    label,
    settings
FROM
    workflow
WHERE
    id = ?1
        ",
    )
        .bind(id)
        .try_map(to_workflow)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn list_workflows_sqlite(
    sqlite: &SqliteBackend,
) -> Result<Vec<Workflow>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    label,
    settings
FROM
    workflow
ORDER BY
    id
        ",
    )
        .try_map(to_workflow)
        .fetch_all(&*sqlite.pool)
        .await?
    )
}

async fn update_workflow_settings_sqlite(
    sqlite: &SqliteBackend,
    id: &str,
    settings: &WorkflowSettings,
) -> Result<bool, BackendError> {
    let settings = serde_json::to_string(settings)?;
    let rows_affected = sqlx::query(
        "
UPDATE
    workflow
SET
    settings = ?2
WHERE
    id = ?1
        ",
    )
        .bind(id)
        .bind(settings)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

#[async_trait]
impl WorkflowBackend for SqliteBackend {
    async fn add_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<(), BackendError> {
        add_workflow_sqlite(self, workflow).await
    }
    async fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Option<Workflow>, BackendError> {
        get_workflow_sqlite(self, id).await
    }
    async fn list_workflows(
        &self,
    ) -> Result<Vec<Workflow>, BackendError> {
        list_workflows_sqlite(self).await
    }
    async fn update_workflow_settings(
        &self,
        id: &str,
        settings: &WorkflowSettings,
    ) -> Result<bool, BackendError> {
        update_workflow_settings_sqlite(self, id, settings).await
    }
}
