use wfcore::{
    ac::Agent,
    history::{
        HistoryQuery,
        HistoryRecord,
        traits::HistoryBackend,
    },
    state::traits::StateBackend,
    transition::{
        EntityRef,
        TransitionInstance,
        TransitionStatus,
    },
};

use crate::{
    chrono::Utc,
    context::RequestContext,
    error::{
        CtrlError,
        PlatformError,
    },
    platform::Platform,
};

impl Platform {
    pub async fn get_history(
        &self,
        hid: i64,
    ) -> Result<HistoryRecord, PlatformError> {
        Ok(self.wf_platform.get_history(hid).await?
            .ok_or(CtrlError::UnknownHistory(hid))?)
    }

    pub async fn find_latest_history(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<HistoryRecord>, PlatformError> {
        Ok(self.wf_platform.find_latest_history(target, field_name).await?)
    }

    pub async fn find_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<HistoryRecord>, PlatformError> {
        Ok(self.wf_platform.find_history(query).await?)
    }

    /// A record can be reverted if it changed state and its from state
    /// is still an active state other than the creation state.
    pub async fn is_revertible(
        &self,
        record: &HistoryRecord,
    ) -> Result<bool, PlatformError> {
        if !record.has_state_change() {
            return Ok(false);
        }
        Ok(self.wf_platform.get_state(&record.from_sid).await?
            .map(|state| state.active && !state.creation)
            .unwrap_or(false))
    }

    /// Moves the item back to the from state of the history record.
    pub async fn revert(
        &self,
        ctx: &mut RequestContext,
        hid: i64,
        agent: Agent,
    ) -> Result<String, PlatformError> {
        let record = self.get_history(hid).await?;
        if !self.is_revertible(&record).await? {
            Err(CtrlError::NotRevertible(hid))?
        }
        let mut instance = TransitionInstance::new(
            &record.workflow_id,
            record.entity_ref(),
            &record.field_name,
            &record.to_sid,
            &record.from_sid,
            agent,
            Utc::now().timestamp(),
        )
            .comment("State reverted.")
            .force(true);
        let sid = self.execute_and_update_entity(ctx, &mut instance, true).await?;
        if instance.status == TransitionStatus::Executed {
            log::info!("reverted history record {hid}: {instance}");
        }
        Ok(sid)
    }
}

#[cfg(test)]
mod tests {
    use wfcore::{
        ac::Agent,
        content::{
            ContentItem,
            traits::ContentBackend,
        },
        history::{
            HistoryOrder,
            HistoryQuery,
        },
        transition::{
            EntityRef,
            TransitionInstance,
        },
    };
    use crate::{
        context::RequestContext,
        error::{
            CtrlError,
            PlatformError,
        },
        testing::create_sqlite_platform,
    };

    #[async_std::test]
    async fn revert_latest() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let target = EntityRef::new("node", 2);
        let mut ctx = RequestContext::new();
        let mut t = TransitionInstance::new(
            "editorial",
            target.clone(),
            "field_state",
            "",
            "editorial_published",
            Agent::User(1),
            1234567890,
        );
        platform.execute_and_update_entity(&mut ctx, &mut t, false).await?;
        let record = platform.find_latest_history(&target, "field_state").await?
            .expect("history recorded");
        assert!(platform.is_revertible(&record).await?);

        let mut ctx = RequestContext::new();
        assert_eq!(
            platform.revert(&mut ctx, record.hid, Agent::User(1)).await?,
            "editorial_review",
        );
        let node = platform.content.load_content(&target).await?
            .expect("fixture has node 2");
        assert_eq!(node.field_value("field_state").as_deref(), Some("editorial_review"));

        let history = platform.find_history(
            &HistoryQuery::new("node", vec![2]).order(HistoryOrder::Desc)
        ).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].comment.as_deref(), Some("State reverted."));
        assert_eq!(history[0].from_sid, "editorial_published");

        assert!(matches!(
            platform.revert(&mut ctx, 999, Agent::User(1)).await,
            Err(PlatformError::CtrlError(CtrlError::UnknownHistory(999))),
        ));
        Ok(())
    }

    #[async_std::test]
    async fn creation_not_revertible() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();
        let mut t = TransitionInstance::new(
            "editorial",
            EntityRef::new("node", 4),
            "field_state",
            "",
            "editorial_draft",
            Agent::User(2),
            1234567890,
        );
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_draft",
        );
        let record = platform.find_latest_history(&EntityRef::new("node", 4), "field_state").await?
            .expect("history recorded");
        assert_eq!(record.from_sid, "editorial_creation");
        assert!(!platform.is_revertible(&record).await?);
        assert!(matches!(
            platform.revert(&mut ctx, record.hid, Agent::User(2)).await,
            Err(PlatformError::CtrlError(CtrlError::NotRevertible(_))),
        ));
        Ok(())
    }
}
