use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::SqliteRow,
};
use wfcore::{
    error::BackendError,
    rule::{
        TransitionRule,
        TransitionRules,
        traits::RuleBackend,
    },
};

use crate::SqliteBackend;

fn to_rule(row: SqliteRow) -> Result<TransitionRule, sqlx::Error> {
    let roles: String = row.try_get("roles")?;
    Ok(TransitionRule {
        id: row.try_get("id")?,
        workflow_id: row.try_get("workflow_id")?,
        from_sid: row.try_get("from_sid")?,
        to_sid: row.try_get("to_sid")?,
        label: row.try_get("label")?,
        roles: serde_json::from_str(&roles)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

async fn insert_rule_sqlite(
    sqlite: &SqliteBackend,
    rule: &TransitionRule,
) -> Result<(), BackendError> {
    let roles = serde_json::to_string(&rule.roles)?;
    sqlx::query(
        "
INSERT INTO workflow_rule (
    id,
    workflow_id,
    from_sid,
    to_sid,
    label,
    roles
)
VALUES ( ?1, ?2, ?3, ?4, ?5, ?6 )\
        ",
    )
        .bind(&rule.id)
        .bind(&rule.workflow_id)
        .bind(&rule.from_sid)
        .bind(&rule.to_sid)
        .bind(&rule.label)
        .bind(roles)
        .execute(&*sqlite.pool)
        .await?;
    Ok(())
}

async fn get_rule_sqlite(
    sqlite: &SqliteBackend,
    id: &str,
) -> Result<Option<TransitionRule>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    workflow_id,
    from_sid,
    to_sid,
    label,
    roles
FROM
    workflow_rule
WHERE
    id = ?1
        ",
    )
        .bind(id)
        .try_map(to_rule)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn list_rules_sqlite(
    sqlite: &SqliteBackend,
    workflow_id: &str,
) -> Result<TransitionRules, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    workflow_id,
    from_sid,
    to_sid,
    label,
    roles
FROM
    workflow_rule
WHERE
    workflow_id = ?1
ORDER BY
    id
        ",
    )
        .bind(workflow_id)
        .try_map(to_rule)
        .fetch_all(&*sqlite.pool)
        .await?
        .into()
    )
}

async fn update_rule_sqlite(
    sqlite: &SqliteBackend,
    rule: &TransitionRule,
) -> Result<bool, BackendError> {
    let roles = serde_json::to_string(&rule.roles)?;
    let rows_affected = sqlx::query(
        "
UPDATE
    workflow_rule
SET
    label = ?2,
    roles = ?3
WHERE
    id = ?1
        ",
    )
        .bind(&rule.id)
        .bind(&rule.label)
        .bind(roles)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

async fn delete_rule_sqlite(
    sqlite: &SqliteBackend,
    id: &str,
) -> Result<bool, BackendError> {
    let rows_affected = sqlx::query("DELETE FROM workflow_rule WHERE id = ?1")
        .bind(id)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

#[async_trait]
impl RuleBackend for SqliteBackend {
    async fn insert_rule(
        &self,
        rule: &TransitionRule,
    ) -> Result<(), BackendError> {
        insert_rule_sqlite(self, rule).await
    }
    async fn get_rule(
        &self,
        id: &str,
    ) -> Result<Option<TransitionRule>, BackendError> {
        get_rule_sqlite(self, id).await
    }
    async fn list_rules(
        &self,
        workflow_id: &str,
    ) -> Result<TransitionRules, BackendError> {
        list_rules_sqlite(self, workflow_id).await
    }
    async fn update_rule(
        &self,
        rule: &TransitionRule,
    ) -> Result<bool, BackendError> {
        update_rule_sqlite(self, rule).await
    }
    async fn delete_rule(
        &self,
        id: &str,
    ) -> Result<bool, BackendError> {
        delete_rule_sqlite(self, id).await
    }
}
