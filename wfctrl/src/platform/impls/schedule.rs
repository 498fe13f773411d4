use wfcore::{
    error::TransitionError,
    schedule::traits::ScheduleBackend,
    transition::{
        EntityRef,
        TransitionInstance,
        TransitionStatus,
    },
};

use crate::{
    context::RequestContext,
    error::PlatformError,
    platform::{
        Platform,
        SweepReport,
    },
};

impl Platform {
    /// Stores the instance as the pending transition for its field,
    /// replacing any earlier one.
    pub async fn schedule_transition(
        &self,
        instance: &mut TransitionInstance,
    ) -> Result<i64, PlatformError> {
        let superseded = self.wf_platform
            .delete_scheduled_for(&instance.target, &instance.field_name)
            .await?;
        if superseded > 0 {
            log::debug!(
                "superseded pending transition for {} [{}]",
                instance.target,
                instance.field_name,
            );
        }
        instance.scheduled = true;
        instance.id = self.wf_platform.insert_scheduled(instance).await?;
        instance.status = TransitionStatus::Scheduled;
        log::info!("scheduled transition {} at {}: {instance}", instance.id, instance.timestamp);
        Ok(instance.id)
    }

    pub async fn pending_for(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<TransitionInstance>, PlatformError> {
        Ok(self.wf_platform.get_scheduled_for(target, field_name).await?)
    }

    /// Executes every pending transition due at `now`.
    ///
    /// Instances whose target is gone, or whose target moved on from the
    /// recorded from state, are discarded.  Every due instance is removed
    /// from the pending store, whatever the outcome.
    pub async fn run_due(
        &self,
        ctx: &mut RequestContext,
        now: i64,
    ) -> Result<SweepReport, PlatformError> {
        let due = self.wf_platform.list_due(now).await?;
        log::debug!("{} scheduled transition(s) due at {now}", due.len());
        let mut report = SweepReport::default();

        for mut instance in due.into_iter() {
            let id = instance.id;
            match self.content.load_content(&instance.target).await? {
                None => {
                    log::warn!(
                        "discarding scheduled transition {id}: {}",
                        TransitionError::MissingEntity(instance.target.to_string()),
                    );
                    instance.status = TransitionStatus::Discarded;
                    report.discarded += 1;
                }
                Some(mut content) => {
                    let current = self.current_sid(
                        &instance.workflow_id,
                        &*content,
                        &instance.field_name,
                    ).await?;
                    if current != instance.from_sid {
                        log::error!(
                            "discarding scheduled transition {id}: {}",
                            TransitionError::Drifted {
                                current,
                                expected: instance.from_sid.clone(),
                            },
                        );
                        instance.status = TransitionStatus::Discarded;
                        report.discarded += 1;
                    } else {
                        if !instance.has_comment() {
                            instance.comment = Some(match instance.uid {
                                Some(uid) => format!("Scheduled by user {uid}."),
                                None => "Scheduled by user anonymous.".to_string(),
                            });
                        }
                        instance.scheduled = false;
                        instance.forced = true;
                        self.execute_and_update_content(
                            ctx,
                            &mut instance,
                            content.as_mut(),
                            true,
                        ).await?;
                        if instance.status == TransitionStatus::Executed {
                            report.executed += 1;
                        } else {
                            report.rejected += 1;
                        }
                    }
                }
            }
            self.wf_platform.delete_scheduled(id).await?;
        }

        log::debug!(
            "sweep done: {} executed, {} discarded, {} rejected",
            report.executed,
            report.discarded,
            report.rejected,
        );
        Ok(report)
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
        history::HistoryQuery,
        transition::{
            EntityRef,
            TransitionInstance,
            TransitionStatus,
        },
    };
    use crate::{
        context::RequestContext,
        platform::SweepReport,
        testing::create_sqlite_platform,
    };

    #[async_std::test]
    async fn schedule_then_sweep() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();
        let target = EntityRef::new("node", 2);
        let mut t = TransitionInstance::new(
            "editorial",
            target.clone(),
            "field_state",
            "",
            "editorial_published",
            Agent::User(1),
            0,
        ).schedule_at(2000000000);

        // the current state is returned while the transition is pending
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_review",
        );
        assert_eq!(t.status, TransitionStatus::Scheduled);
        let pending = platform.pending_for(&target, "field_state").await?
            .expect("instance is pending");
        assert_eq!(pending.from_sid, "editorial_review");
        assert_eq!(pending.timestamp, 2000000000);

        // not due yet
        let mut ctx = RequestContext::new();
        assert_eq!(platform.run_due(&mut ctx, 1999999999).await?, SweepReport::default());

        let report = platform.run_due(&mut ctx, 2000000000).await?;
        assert_eq!(report, SweepReport { executed: 1, .. Default::default() });
        assert!(platform.pending_for(&target, "field_state").await?.is_none());

        let node = platform.content.load_content(&target).await?
            .expect("fixture has node 2");
        assert_eq!(node.field_value("field_state").as_deref(), Some("editorial_published"));
        let history = platform.find_history(&HistoryQuery::new("node", vec![2])).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].comment.as_deref(), Some("Scheduled by user 1."));
        Ok(())
    }

    #[async_std::test]
    async fn supersede() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let target = EntityRef::new("node", 2);
        for (to, ts) in [
            ("editorial_published", 2000000000),
            ("editorial_draft", 2000000100),
        ] {
            let mut t = TransitionInstance::new(
                "editorial",
                target.clone(),
                "field_state",
                "editorial_review",
                to,
                Agent::User(1),
                0,
            ).schedule_at(ts);
            platform.schedule_transition(&mut t).await?;
        }
        let pending = platform.pending_for(&target, "field_state").await?
            .expect("instance is pending");
        assert_eq!(pending.to_sid, "editorial_draft");
        assert_eq!(pending.timestamp, 2000000100);

        let mut ctx = RequestContext::new();
        let report = platform.run_due(&mut ctx, 2000000100).await?;
        assert_eq!(report.executed, 1);
        Ok(())
    }
}
