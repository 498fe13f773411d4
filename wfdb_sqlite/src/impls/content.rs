use async_trait::async_trait;
use sqlx::Row;
use wfcore::{
    content::{
        Content,
        ContentItem,
        traits::ContentBackend,
    },
    error::BackendError,
    transition::EntityRef,
};

use crate::SqliteBackend;

async fn load_content_sqlite(
    sqlite: &SqliteBackend,
    target: &EntityRef,
) -> Result<Option<Content>, BackendError> {
    let row = sqlx::query(
        "
SELECT
    owner_id,
    changed
FROM
    content
WHERE
    entity_type = ?1
    AND entity_id = ?2
        ",
    )
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .fetch_optional(&*sqlite.pool)
        .await?;
    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };
    let fields = sqlx::query(
        "
SELECT
    field_name,
    value
FROM
    content_field
WHERE
    entity_type = ?1
    AND entity_id = ?2
        ",
    )
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .try_map(|row: sqlx::sqlite::SqliteRow| Ok((
            row.try_get::<String, _>("field_name")?,
            row.try_get::<String, _>("value")?,
        )))
        .fetch_all(&*sqlite.pool)
        .await?;
    Ok(Some(Content {
        entity_type: target.entity_type.clone(),
        entity_id: target.entity_id,
        owner_id: row.try_get("owner_id")?,
        changed: row.try_get("changed")?,
        fields: fields.into_iter().collect(),
        new: false,
    }))
}

async fn save_content_sqlite(
    sqlite: &SqliteBackend,
    content: &dyn ContentItem,
) -> Result<bool, BackendError> {
    let target = content.entity_ref();
    let mut tx = sqlite.pool.begin().await?;
    sqlx::query(
        "
INSERT INTO content (
    entity_type,
    entity_id,
    owner_id,
    changed
)
VALUES ( ?1, ?2, ?3, ?4 )
ON CONFLICT(entity_type, entity_id) DO UPDATE SET
    owner_id = excluded.owner_id,
    changed = excluded.changed
        ",
    )
        .bind(&target.entity_type)
        .bind(target.entity_id)
        .bind(content.owner_id())
        .bind(content.changed_time())
        .execute(&mut *tx)
        .await?;
    for field_name in content.field_names() {
        let value = content.field_value(&field_name).unwrap_or_default();
        sqlx::query(
            "
INSERT INTO content_field (
    entity_type,
    entity_id,
    field_name,
    value
)
VALUES ( ?1, ?2, ?3, ?4 )
ON CONFLICT(entity_type, entity_id, field_name) DO UPDATE SET
    value = excluded.value
            ",
        )
            .bind(&target.entity_type)
            .bind(target.entity_id)
            .bind(&field_name)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(true)
}

async fn list_content_in_state_sqlite(
    sqlite: &SqliteBackend,
    entity_type: &str,
    field_name: &str,
    sid: &str,
) -> Result<Vec<i64>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    entity_id
FROM
    content_field
WHERE
    entity_type = ?1
    AND field_name = ?2
    AND value = ?3
ORDER BY
    entity_id
        ",
    )
        .bind(entity_type)
        .bind(field_name)
        .bind(sid)
        .try_map(|row: sqlx::sqlite::SqliteRow| row.try_get("entity_id"))
        .fetch_all(&*sqlite.pool)
        .await?
    )
}

#[async_trait]
impl ContentBackend for SqliteBackend {
    async fn load_content(
        &self,
        target: &EntityRef,
    ) -> Result<Option<Box<dyn ContentItem>>, BackendError> {
        Ok(load_content_sqlite(self, target).await?
            .map(|content| Box::new(content) as Box<dyn ContentItem>))
    }
    async fn save_content(
        &self,
        content: &dyn ContentItem,
    ) -> Result<bool, BackendError> {
        save_content_sqlite(self, content).await
    }
    async fn list_content_in_state(
        &self,
        entity_type: &str,
        field_name: &str,
        sid: &str,
    ) -> Result<Vec<i64>, BackendError> {
        list_content_in_state_sqlite(self, entity_type, field_name, sid).await
    }
}
