use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::SqliteRow,
};
use wfcore::{
    error::BackendError,
    schedule::traits::ScheduleBackend,
    transition::{
        EntityRef,
        TransitionInstance,
        TransitionStatus,
    },
};

use crate::SqliteBackend;

const SCHEDULED_COLUMNS: &str = "
SELECT
    tid,
    workflow_id,
    entity_type,
    entity_id,
    field_name,
    from_sid,
    to_sid,
    uid,
    timestamp,
    comment,
    attached,
    forced
FROM
    workflow_scheduled
";

fn to_instance(row: SqliteRow) -> Result<TransitionInstance, sqlx::Error> {
    let attached: String = row.try_get("attached")?;
    Ok(TransitionInstance {
        id: row.try_get("tid")?,
        workflow_id: row.try_get("workflow_id")?,
        from_sid: row.try_get("from_sid")?,
        to_sid: row.try_get("to_sid")?,
        target: EntityRef {
            entity_type: row.try_get("entity_type")?,
            entity_id: row.try_get("entity_id")?,
        },
        field_name: row.try_get("field_name")?,
        uid: row.try_get("uid")?,
        timestamp: row.try_get("timestamp")?,
        comment: row.try_get("comment")?,
        attached: serde_json::from_str(&attached)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        scheduled: true,
        executed: false,
        forced: row.try_get("forced")?,
        status: TransitionStatus::Scheduled,
    })
}

async fn insert_scheduled_sqlite(
    sqlite: &SqliteBackend,
    instance: &TransitionInstance,
) -> Result<i64, BackendError> {
    let attached = serde_json::to_string(&instance.attached)?;
    let tid = sqlx::query(
        "
INSERT INTO workflow_scheduled (
    workflow_id,
    entity_type,
    entity_id,
    field_name,
    from_sid,
    to_sid,
    uid,
    timestamp,
    comment,
    attached,
    forced
)
VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11 )\
        ",
    )
        .bind(&instance.workflow_id)
        .bind(&instance.target.entity_type)
        .bind(instance.target.entity_id)
        .bind(&instance.field_name)
        .bind(&instance.from_sid)
        .bind(&instance.to_sid)
        .bind(instance.uid)
        .bind(instance.timestamp)
        .bind(&instance.comment)
        .bind(attached)
        .bind(instance.forced)
        .execute(&*sqlite.pool)
        .await?
        .last_insert_rowid();
    Ok(tid)
}

async fn get_scheduled_for_sqlite(
    sqlite: &SqliteBackend,
    target: &EntityRef,
    field_name: &str,
) -> Result<Option<TransitionInstance>, BackendError> {
    Ok(sqlx::query(&format!("\
{SCHEDULED_COLUMNS}\
WHERE
    entity_type = ?1
    AND entity_id = ?2
    AND field_name = ?3
ORDER BY
    tid DESC
LIMIT 1
    "))
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .bind(field_name)
        .try_map(to_instance)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn delete_scheduled_for_sqlite(
    sqlite: &SqliteBackend,
    target: &EntityRef,
    field_name: &str,
) -> Result<u64, BackendError> {
    Ok(sqlx::query(
        "
DELETE FROM
    workflow_scheduled
WHERE
    entity_type = ?1
    AND entity_id = ?2
    AND field_name = ?3
        ",
    )
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .bind(field_name)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected()
    )
}

async fn delete_scheduled_sqlite(
    sqlite: &SqliteBackend,
    id: i64,
) -> Result<bool, BackendError> {
    let rows_affected = sqlx::query("DELETE FROM workflow_scheduled WHERE tid = ?1")
        .bind(id)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

async fn list_due_sqlite(
    sqlite: &SqliteBackend,
    now: i64,
) -> Result<Vec<TransitionInstance>, BackendError> {
    Ok(sqlx::query(&format!("\
{SCHEDULED_COLUMNS}\
WHERE
    timestamp <= ?1
ORDER BY
    timestamp,
    tid
    "))
        .bind(now)
        .try_map(to_instance)
        .fetch_all(&*sqlite.pool)
        .await?
    )
}

#[async_trait]
impl ScheduleBackend for SqliteBackend {
    async fn insert_scheduled(
        &self,
        instance: &TransitionInstance,
    ) -> Result<i64, BackendError> {
        insert_scheduled_sqlite(self, instance).await
    }
    async fn get_scheduled_for(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<TransitionInstance>, BackendError> {
        get_scheduled_for_sqlite(self, target, field_name).await
    }
    async fn delete_scheduled_for(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<u64, BackendError> {
        delete_scheduled_for_sqlite(self, target, field_name).await
    }
    async fn delete_scheduled(
        &self,
        id: i64,
    ) -> Result<bool, BackendError> {
        delete_scheduled_sqlite(self, id).await
    }
    async fn list_due(
        &self,
        now: i64,
    ) -> Result<Vec<TransitionInstance>, BackendError> {
        list_due_sqlite(self, now).await
    }
}
