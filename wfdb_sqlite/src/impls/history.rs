use async_trait::async_trait;
use sqlx::{
    QueryBuilder,
    Row,
    Sqlite,
    sqlite::SqliteRow,
};
use wfcore::{
    error::BackendError,
    history::{
        HistoryQuery,
        HistoryRecord,
        traits::HistoryBackend,
    },
    transition::EntityRef,
};

use crate::SqliteBackend;

const HISTORY_COLUMNS: &str = "
SELECT
    hid,
    workflow_id,
    entity_type,
    entity_id,
    field_name,
    from_sid,
    to_sid,
    uid,
    timestamp,
    comment
FROM
    workflow_history
";

fn to_history_record(row: SqliteRow) -> Result<HistoryRecord, sqlx::Error> {
    Ok(HistoryRecord {
        hid: row.try_get("hid")?,
        workflow_id: row.try_get("workflow_id")?,
        entity_type: row.try_get("entity_type")?,
        entity_id: row.try_get("entity_id")?,
        field_name: row.try_get("field_name")?,
        from_sid: row.try_get("from_sid")?,
        to_sid: row.try_get("to_sid")?,
        uid: row.try_get("uid")?,
        timestamp: row.try_get("timestamp")?,
        comment: row.try_get("comment")?,
    })
}

async fn append_history_sqlite(
    sqlite: &SqliteBackend,
    record: &HistoryRecord,
) -> Result<i64, BackendError> {
    if record.hid > 0 {
        log::warn!("appending history record with existing hid {}", record.hid);
    }
    let hid = sqlx::query(
        "
INSERT INTO workflow_history (
    workflow_id,
    entity_type,
    entity_id,
    field_name,
    from_sid,
    to_sid,
    uid,
    timestamp,
    comment
)
VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9 )\
        ",
    )
        .bind(&record.workflow_id)
        .bind(&record.entity_type)
        .bind(record.entity_id)
        .bind(&record.field_name)
        .bind(&record.from_sid)
        .bind(&record.to_sid)
        .bind(record.uid)
        .bind(record.timestamp)
        .bind(&record.comment)
        .execute(&*sqlite.pool)
        .await?
        .last_insert_rowid();
    Ok(hid)
}

async fn get_history_sqlite(
    sqlite: &SqliteBackend,
    hid: i64,
) -> Result<Option<HistoryRecord>, BackendError> {
    Ok(sqlx::query(&format!("{HISTORY_COLUMNS}WHERE hid = ?1"))
        .bind(hid)
        .try_map(to_history_record)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn find_latest_history_sqlite(
    sqlite: &SqliteBackend,
    target: &EntityRef,
    field_name: &str,
) -> Result<Option<HistoryRecord>, BackendError> {
    Ok(sqlx::query(&format!("\
{HISTORY_COLUMNS}\
WHERE
    entity_type = ?1
    AND entity_id = ?2
    AND field_name = ?3
ORDER BY
    timestamp DESC,
    hid DESC
LIMIT 1
    "))
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .bind(field_name)
        .try_map(to_history_record)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn find_history_sqlite(
    sqlite: &SqliteBackend,
    query: &HistoryQuery,
) -> Result<Vec<HistoryRecord>, BackendError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(HISTORY_COLUMNS);
    builder.push("WHERE entity_type = ");
    builder.push_bind(&query.entity_type);
    // no ids selects every item of the entity type
    if !query.entity_ids.is_empty() {
        builder.push(" AND entity_id IN (");
        let mut separated = builder.separated(", ");
        for id in query.entity_ids.iter() {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
    if let Some(field_name) = &query.field_name {
        builder.push(" AND field_name = ");
        builder.push_bind(field_name);
    }
    builder.push(format!(
        " ORDER BY timestamp {}, hid DESC",
        query.order.as_sql(),
    ));
    if query.limit.is_some() || query.offset.is_some() {
        builder.push(" LIMIT ");
        builder.push_bind(query.limit.unwrap_or(-1));
        builder.push(" OFFSET ");
        builder.push_bind(query.offset.unwrap_or(0));
    }
    Ok(builder.build()
        .try_map(to_history_record)
        .fetch_all(&*sqlite.pool)
        .await?
    )
}

async fn purge_history_by_sid_sqlite(
    sqlite: &SqliteBackend,
    sid: &str,
) -> Result<u64, BackendError> {
    Ok(sqlx::query(
        "
DELETE FROM
    workflow_history
WHERE
    from_sid = ?1
    OR to_sid = ?1
        ",
    )
        .bind(sid)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected()
    )
}

#[async_trait]
impl HistoryBackend for SqliteBackend {
    async fn append_history(
        &self,
        record: &HistoryRecord,
    ) -> Result<i64, BackendError> {
        append_history_sqlite(self, record).await
    }
    async fn get_history(
        &self,
        hid: i64,
    ) -> Result<Option<HistoryRecord>, BackendError> {
        get_history_sqlite(self, hid).await
    }
    async fn find_latest_history(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<HistoryRecord>, BackendError> {
        find_latest_history_sqlite(self, target, field_name).await
    }
    async fn find_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<HistoryRecord>, BackendError> {
        find_history_sqlite(self, query).await
    }
    async fn purge_history_by_sid(
        &self,
        sid: &str,
    ) -> Result<u64, BackendError> {
        purge_history_by_sid_sqlite(self, sid).await
    }
}
