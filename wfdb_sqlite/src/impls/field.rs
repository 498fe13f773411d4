use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::SqliteRow,
};
use wfcore::{
    content::{
        WorkflowField,
        traits::FieldBackend,
    },
    error::BackendError,
};

use crate::SqliteBackend;

fn to_field(row: SqliteRow) -> Result<WorkflowField, sqlx::Error> {
    Ok(WorkflowField {
        entity_type: row.try_get("entity_type")?,
        field_name: row.try_get("field_name")?,
        workflow_id: row.try_get("workflow_id")?,
    })
}

async fn bind_field_sqlite(
    sqlite: &SqliteBackend,
    field: &WorkflowField,
) -> Result<(), BackendError> {
    sqlx::query(
        "
INSERT INTO workflow_field (
    entity_type,
    field_name,
    workflow_id
)
VALUES ( ?1, ?2, ?3 )
ON CONFLICT(entity_type, field_name) DO UPDATE SET
    workflow_id = excluded.workflow_id
        ",
    )
        .bind(&field.entity_type)
        .bind(&field.field_name)
        .bind(&field.workflow_id)
        .execute(&*sqlite.pool)
        .await?;
    Ok(())
}

async fn get_field_sqlite(
    sqlite: &SqliteBackend,
    entity_type: &str,
    field_name: &str,
) -> Result<Option<WorkflowField>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    entity_type,
    field_name,
    workflow_id
FROM
    workflow_field
WHERE
    entity_type = ?1
    AND field_name = ?2
        ",
    )
        .bind(entity_type)
        .bind(field_name)
        .try_map(to_field)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn list_fields_sqlite(
    sqlite: &SqliteBackend,
    workflow_id: Option<&str>,
) -> Result<Vec<WorkflowField>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    entity_type,
    field_name,
    workflow_id
FROM
    workflow_field
WHERE
    ?1 IS NULL
    OR workflow_id = ?1
ORDER BY
    entity_type,
    field_name
        ",
    )
        .bind(workflow_id)
        .try_map(to_field)
        .fetch_all(&*sqlite.pool)
        .await?
    )
}

#[async_trait]
impl FieldBackend for SqliteBackend {
    async fn bind_field(
        &self,
        field: &WorkflowField,
    ) -> Result<(), BackendError> {
        bind_field_sqlite(self, field).await
    }
    async fn get_field(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Option<WorkflowField>, BackendError> {
        get_field_sqlite(self, entity_type, field_name).await
    }
    async fn list_fields(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowField>, BackendError> {
        list_fields_sqlite(self, workflow_id).await
    }
}
