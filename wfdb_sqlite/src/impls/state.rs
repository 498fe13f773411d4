use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::SqliteRow,
};
use wfcore::{
    error::BackendError,
    state::{
        State,
        States,
        traits::StateBackend,
    },
};

use crate::SqliteBackend;

fn to_state(row: SqliteRow) -> Result<State, sqlx::Error> {
    Ok(State {
        id: row.try_get("id")?,
        workflow_id: row.try_get("workflow_id")?,
        label: row.try_get("label")?,
        weight: row.try_get("weight")?,
        active: row.try_get("active")?,
        creation: row.try_get("creation")?,
    })
}

async fn insert_state_sqlite(
    sqlite: &SqliteBackend,
    state: &State,
) -> Result<(), BackendError> {
    sqlx::query(
        "
INSERT INTO workflow_state (
    id,
    workflow_id,
    label,
    weight,
    active,
    creation
)
VALUES ( ?1, ?2, ?3, ?4, ?5, ?6 )\
        ",
    )
        .bind(&state.id)
        .bind(&state.workflow_id)
        .bind(&state.label)
        .bind(state.weight)
        .bind(state.active)
        .bind(state.creation)
        .execute(&*sqlite.pool)
        .await?;
    Ok(())
}

async fn get_state_sqlite(
    sqlite: &SqliteBackend,
    sid: &str,
) -> Result<Option<State>, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    workflow_id,
    label,
    weight,
    active,
    creation
FROM
    workflow_state
WHERE
    id = ?1
        ",
    )
        .bind(sid)
        .try_map(to_state)
        .fetch_optional(&*sqlite.pool)
        .await?
    )
}

async fn list_states_sqlite(
    sqlite: &SqliteBackend,
    workflow_id: &str,
) -> Result<States, BackendError> {
    Ok(sqlx::query(
        "
SELECT
    id,
    workflow_id,
    label,
    weight,
    active,
    creation
FROM
    workflow_state
WHERE
    workflow_id = ?1
ORDER BY
    weight,
    id
        ",
    )
        .bind(workflow_id)
        .try_map(to_state)
        .fetch_all(&*sqlite.pool)
        .await?
        .into()
    )
}

async fn update_state_sqlite(
    sqlite: &SqliteBackend,
    state: &State,
) -> Result<bool, BackendError> {
    let rows_affected = sqlx::query(
        "
UPDATE
    workflow_state
SET
    label = ?2,
    weight = ?3,
    active = ?4
WHERE
    id = ?1
        ",
    )
        .bind(&state.id)
        .bind(&state.label)
        .bind(state.weight)
        .bind(state.active)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

async fn delete_state_sqlite(
    sqlite: &SqliteBackend,
    sid: &str,
) -> Result<bool, BackendError> {
    let rows_affected = sqlx::query("DELETE FROM workflow_state WHERE id = ?1")
        .bind(sid)
        .execute(&*sqlite.pool)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}

#[async_trait]
impl StateBackend for SqliteBackend {
    async fn insert_state(
        &self,
        state: &State,
    ) -> Result<(), BackendError> {
        insert_state_sqlite(self, state).await
    }
    async fn get_state(
        &self,
        sid: &str,
    ) -> Result<Option<State>, BackendError> {
        get_state_sqlite(self, sid).await
    }
    async fn list_states(
        &self,
        workflow_id: &str,
    ) -> Result<States, BackendError> {
        list_states_sqlite(self, workflow_id).await
    }
    async fn update_state(
        &self,
        state: &State,
    ) -> Result<bool, BackendError> {
        update_state_sqlite(self, state).await
    }
    async fn delete_state(
        &self,
        sid: &str,
    ) -> Result<bool, BackendError> {
        delete_state_sqlite(self, sid).await
    }
}

#[cfg(test)]
mod tests {
    use wfcore::state::{
        State,
        StateFilter,
        traits::StateBackend,
    };
    use crate::impls::tests::editorial;

    #[async_std::test]
    async fn list_and_update() -> anyhow::Result<()> {
        let backend = editorial().await?;
        let states = StateBackend::list_states(&backend, "editorial").await?;
        let ids = states.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, [
            "editorial_creation",
            "editorial_draft",
            "editorial_review",
            "editorial_published",
        ]);
        assert_eq!(states.filter(StateFilter::Active).len(), 3);

        let mut review = StateBackend::get_state(&backend, "editorial_review").await?
            .expect("state present");
        review.active = false;
        review.weight = 10;
        assert!(StateBackend::update_state(&backend, &review).await?);
        let stored = StateBackend::get_state(&backend, "editorial_review").await?;
        assert_eq!(stored, Some(review));
        assert_eq!(
            StateBackend::list_states(&backend, "editorial").await?
                .filter(StateFilter::Active)
                .len(),
            2,
        );

        assert!(StateBackend::delete_state(&backend, "editorial_review").await?);
        assert!(!StateBackend::delete_state(&backend, "editorial_review").await?);
        assert_eq!(StateBackend::get_state(&backend, "editorial_review").await?, None);
        Ok(())
    }

    #[async_std::test]
    async fn single_creation_state() -> anyhow::Result<()> {
        let backend = editorial().await?;
        let mut duplicate = State::creation("editorial");
        duplicate.id = "editorial_other_creation".to_string();
        assert!(StateBackend::insert_state(&backend, &duplicate).await.is_err());
        assert!(StateBackend::insert_state(&backend, &State::creation("editorial")).await.is_err());
        Ok(())
    }
}
