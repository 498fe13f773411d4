use wfcore::{
    ac::{
        Agent,
        Roles,
        role::AUTHOR_ROLE,
        traits::bypass_capability,
    },
    content::ContentItem,
    error::TransitionError,
    history::traits::HistoryBackend,
    rule::traits::RuleBackend,
    schedule::traits::ScheduleBackend,
    state::{
        State,
        traits::StateBackend,
    },
    transition::{
        TransitionInstance,
        TransitionStatus,
    },
    workflow::Workflow,
};

use crate::{
    context::RequestContext,
    error::PlatformError,
    platform::Platform,
};

enum Checked {
    Ready(Workflow),
    /// Nothing more to do; the instance settled on this sid.
    Settled(String),
}

fn rejected(instance: &mut TransitionInstance, error: TransitionError) -> String {
    log::error!("{instance}: {error}");
    instance.reject(error);
    instance.from_sid.clone()
}

impl Platform {
    /// The state the field of the content item is in, falling back to
    /// the previous state for items without a value.
    pub async fn current_sid(
        &self,
        workflow_id: &str,
        content: &dyn ContentItem,
        field_name: &str,
    ) -> Result<String, PlatformError> {
        match content.field_value(field_name) {
            Some(sid) => Ok(sid),
            None => self.previous_sid(workflow_id, content, field_name).await,
        }
    }

    pub async fn previous_sid(
        &self,
        workflow_id: &str,
        content: &dyn ContentItem,
        field_name: &str,
    ) -> Result<String, PlatformError> {
        if !content.is_new() {
            if let Some(record) = self.wf_platform
                .find_latest_history(&content.entity_ref(), field_name)
                .await?
            {
                return Ok(record.to_sid);
            }
        }
        Ok(State::creation_sid(workflow_id))
    }

    /// The roles the agent holds for the content item, including the
    /// author role for its owner.
    pub fn agent_roles(&self, agent: &Agent, content: &dyn ContentItem) -> Roles {
        let mut roles = self.resolver.roles(agent);
        if agent.is_owner_of(content.owner_id()) {
            roles.insert(AUTHOR_ROLE);
        }
        roles
    }

    /// An instance is valid when its target exists and its from state
    /// can be resolved within the workflow.
    pub async fn is_valid(
        &self,
        instance: &TransitionInstance,
    ) -> Result<bool, PlatformError> {
        let Some(content) = self.content.load_content(&instance.target).await? else {
            return Ok(false);
        };
        let from_sid = if instance.from_sid.is_empty() {
            self.current_sid(&instance.workflow_id, &*content, &instance.field_name).await?
        } else {
            instance.from_sid.clone()
        };
        Ok(self.wf_platform.list_states(&instance.workflow_id).await?
            .get(&from_sid)
            .is_some())
    }

    /// Validates, authorizes and records the instance, or stores it if it
    /// is scheduled.  The state field of the content item is left alone.
    ///
    /// Returns the to sid, or the from sid if the instance got rejected;
    /// the reason is kept in the status of the instance.
    pub async fn execute(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        force: bool,
    ) -> Result<String, PlatformError> {
        match self.content.load_content(&instance.target).await? {
            Some(content) => self.execute_on(ctx, instance, &*content, force).await,
            None => {
                let error = TransitionError::MissingEntity(instance.target.to_string());
                Ok(rejected(instance, error))
            }
        }
    }

    /// Like [`Platform::execute`], but also writes the new state into the
    /// content item and saves it.
    pub async fn execute_and_update_entity(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        force: bool,
    ) -> Result<String, PlatformError> {
        match self.content.load_content(&instance.target).await? {
            Some(mut content) => self.update_on(ctx, instance, content.as_mut(), force).await,
            None => {
                let error = TransitionError::MissingEntity(instance.target.to_string());
                Ok(rejected(instance, error))
            }
        }
    }

    /// Like [`Platform::execute_and_update_entity`] for a content item
    /// held by the caller, such as one that was never stored.
    pub async fn execute_and_update_content(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        content: &mut dyn ContentItem,
        force: bool,
    ) -> Result<String, PlatformError> {
        self.update_on(ctx, instance, content, force).await
    }

    async fn execute_on(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        content: &dyn ContentItem,
        force: bool,
    ) -> Result<String, PlatformError> {
        let workflow = match self.check(ctx, instance, content, force).await? {
            Checked::Ready(workflow) => workflow,
            Checked::Settled(sid) => return Ok(sid),
        };
        if instance.scheduled {
            self.schedule_transition(instance).await?;
            ctx.set_marker(
                &instance.target,
                &instance.field_name,
                &instance.marker_label(),
                &instance.to_sid,
            );
        } else {
            self.record(ctx, instance, &workflow).await?;
        }
        Ok(instance.to_sid.clone())
    }

    async fn update_on(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        content: &mut dyn ContentItem,
        force: bool,
    ) -> Result<String, PlatformError> {
        let current = self.current_sid(
            &instance.workflow_id,
            &*content,
            &instance.field_name,
        ).await?;
        if instance.from_sid.is_empty() {
            instance.from_sid = current.clone();
        }
        let states = self.wf_platform.list_states(&instance.workflow_id).await?;
        if instance.to_sid.is_empty() || states.get(&instance.to_sid).is_none() {
            let error = TransitionError::InvalidToState(instance.to_sid.clone());
            return Ok(rejected(instance, error));
        }
        // a repeat within the request is left to the re-entrancy check
        let repeat = ctx.marker(
            &instance.target,
            &instance.field_name,
            &instance.marker_label(),
        ).is_some();
        if !instance.executed && !repeat && instance.from_sid != current {
            let error = TransitionError::Drifted {
                current: current.clone(),
                expected: instance.from_sid.clone(),
            };
            log::error!("{instance}: {error}");
            instance.reject(error);
            return Ok(current);
        }

        if instance.scheduled {
            self.execute_on(ctx, instance, &*content, force).await?;
            return self.current_sid(&instance.workflow_id, &*content, &instance.field_name).await;
        }
        if instance.executed {
            return self.execute_on(ctx, instance, &*content, force).await;
        }

        let workflow = match self.check(ctx, instance, &*content, force).await? {
            Checked::Ready(workflow) => workflow,
            Checked::Settled(sid) => return Ok(sid),
        };
        let previous = content.field_value(&instance.field_name);
        let changed = content.changed_time();
        content.set_field_value(&instance.field_name, &instance.to_sid);
        if workflow.settings.always_update_entity {
            content.set_changed_time(instance.timestamp);
        }
        let saved = match self.content.save_content(&*content).await {
            Ok(saved) => saved,
            Err(e) => {
                log::error!("failed to save {}: {e}", instance.target);
                false
            }
        };
        if !saved {
            content.set_field_value(
                &instance.field_name,
                previous.as_deref().unwrap_or_default(),
            );
            content.set_changed_time(changed);
            let error = TransitionError::SaveFailed(instance.target.to_string());
            return Ok(rejected(instance, error));
        }
        self.record(ctx, instance, &workflow).await?;
        Ok(instance.to_sid.clone())
    }

    async fn check(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        content: &dyn ContentItem,
        force: bool,
    ) -> Result<Checked, PlatformError> {
        let workflow = self.load_workflow(&instance.workflow_id).await?;
        if instance.from_sid.is_empty() {
            instance.from_sid = self.current_sid(&workflow.id, content, &instance.field_name).await?;
        }

        let label = instance.marker_label();
        let cached = ctx.marker(&instance.target, &instance.field_name, &label)
            .map(str::to_string);
        if let Some(sid) = cached.filter(|_| !instance.is_empty()) {
            let error = TransitionError::AlreadyExecuted(label);
            log::error!("{instance}: {error}");
            instance.reject(error);
            return Ok(Checked::Settled(sid));
        }
        ctx.set_marker(&instance.target, &instance.field_name, &label, &instance.from_sid);
        instance.forced = instance.forced || force;

        let states = self.wf_platform.list_states(&workflow.id).await?;
        if states.get(&instance.from_sid).is_none() {
            let error = TransitionError::InvalidFromState(instance.from_sid.clone());
            return Ok(Checked::Settled(rejected(instance, error)));
        }
        if instance.has_state_change() && states.get(&instance.to_sid).is_none() {
            let error = TransitionError::InvalidToState(instance.to_sid.clone());
            return Ok(Checked::Settled(rejected(instance, error)));
        }
        instance.status = TransitionStatus::Validated;

        if instance.is_empty() {
            return Ok(Checked::Settled(instance.to_sid.clone()));
        }

        if instance.has_state_change() {
            let agent = instance.agent();
            if !self.is_allowed(instance, content).await? {
                let error = TransitionError::Unauthorized {
                    user: agent.to_string(),
                    from_sid: instance.from_sid.clone(),
                    to_sid: instance.to_sid.clone(),
                };
                return Ok(Checked::Settled(rejected(instance, error)));
            }
            if let Err(reason) = self.hooks.check(instance, &agent) {
                let error = TransitionError::Vetoed(reason);
                log::warn!("{instance}: {error}");
                instance.reject(error);
                return Ok(Checked::Settled(instance.from_sid.clone()));
            }
        }
        Ok(Checked::Ready(workflow))
    }

    async fn is_allowed(
        &self,
        instance: &TransitionInstance,
        content: &dyn ContentItem,
    ) -> Result<bool, PlatformError> {
        if instance.forced {
            return Ok(true);
        }
        let agent = instance.agent();
        let bypass = self.resolver.has_capability(
            &agent,
            &bypass_capability(&instance.workflow_id),
        );
        let states = self.wf_platform.list_states(&instance.workflow_id).await?;
        let rules = self.wf_platform.list_rules(&instance.workflow_id).await?
            .from_state(&states, &instance.from_sid);
        let rule = rules.iter()
            .find(|rule| rule.to_sid == instance.to_sid);
        Ok(match rule {
            Some(rule) => rule.is_allowed(
                &self.agent_roles(&agent, content),
                bypass,
                instance.forced,
            ),
            None => bypass,
        })
    }

    async fn record(
        &self,
        ctx: &mut RequestContext,
        instance: &mut TransitionInstance,
        workflow: &Workflow,
    ) -> Result<(), PlatformError> {
        self.hooks.alter_comment(instance);
        instance.executed = true;
        instance.status = TransitionStatus::Executed;
        if !instance.is_empty() {
            let hid = self.wf_platform.append_history(&instance.to_history_record()).await?;
            self.wf_platform.delete_scheduled_for(&instance.target, &instance.field_name).await?;
            log::trace!("appended history record {hid}");
        }
        ctx.set_marker(
            &instance.target,
            &instance.field_name,
            &instance.marker_label(),
            &instance.to_sid,
        );
        if workflow.settings.watchdog_log {
            log::info!("executed transition {instance}");
        } else {
            log::debug!("executed transition {instance}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wfcore::{
        ac::Agent,
        content::{
            Content,
            ContentItem,
            traits::ContentBackend,
        },
        error::TransitionError,
        history::HistoryQuery,
        transition::{
            EntityRef,
            TransitionInstance,
            TransitionStatus,
        },
    };
    use crate::{
        context::RequestContext,
        testing::create_sqlite_platform,
    };

    fn instance(id: i64, from: &str, to: &str, agent: Agent) -> TransitionInstance {
        TransitionInstance::new(
            "editorial",
            EntityRef::new("node", id),
            "field_state",
            from,
            to,
            agent,
            1234567890,
        )
    }

    #[async_std::test]
    async fn current_and_previous() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let node = Content::new("node", 42, None);
        assert_eq!(
            platform.current_sid("editorial", &node, "field_state").await?,
            "editorial_creation",
        );
        let node = platform.content.load_content(&EntityRef::new("node", 1)).await?
            .expect("fixture has node 1");
        assert_eq!(
            platform.current_sid("editorial", &*node, "field_state").await?,
            "editorial_draft",
        );
        // no history recorded yet for a stored item
        assert_eq!(
            platform.previous_sid("editorial", &*node, "field_state").await?,
            "editorial_creation",
        );
        Ok(())
    }

    #[async_std::test]
    async fn execute_records_history_only() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();
        let mut t = instance(1, "editorial_draft", "editorial_review", Agent::User(2));
        assert_eq!(platform.execute(&mut ctx, &mut t, false).await?, "editorial_review");
        assert_eq!(t.status, TransitionStatus::Executed);
        assert!(t.executed);

        let history = platform.find_history(&HistoryQuery::new("node", vec![1])).await?;
        assert_eq!(history.len(), 1);
        // the field of the content item is untouched
        let node = platform.content.load_content(&EntityRef::new("node", 1)).await?
            .expect("fixture has node 1");
        assert_eq!(node.field_value("field_state").as_deref(), Some("editorial_draft"));
        Ok(())
    }

    #[async_std::test]
    async fn rejections() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();

        let mut t = instance(99, "", "editorial_review", Agent::User(1));
        assert_eq!(platform.execute(&mut ctx, &mut t, false).await?, "");
        assert!(matches!(
            t.status,
            TransitionStatus::Rejected(TransitionError::MissingEntity(_)),
        ));
        assert!(!platform.is_valid(&t).await?);

        let mut t = instance(1, "editorial_gone", "editorial_review", Agent::User(1));
        assert_eq!(platform.execute(&mut ctx, &mut t, false).await?, "editorial_gone");
        assert!(matches!(
            t.status,
            TransitionStatus::Rejected(TransitionError::InvalidFromState(_)),
        ));
        assert!(!platform.is_valid(&t).await?);

        // node 1 is owned by user 2; user 4 holds no role for this rule
        let mut t = instance(1, "", "editorial_review", Agent::User(4));
        assert!(platform.is_valid(&t).await?);
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_draft",
        );
        assert!(matches!(
            t.status,
            TransitionStatus::Rejected(TransitionError::Unauthorized { .. }),
        ));

        let mut t = instance(1, "", "", Agent::User(2));
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_draft",
        );
        assert!(matches!(
            t.status,
            TransitionStatus::Rejected(TransitionError::InvalidToState(_)),
        ));

        assert!(platform.find_history(&HistoryQuery::new("node", vec![])).await?.is_empty());
        Ok(())
    }

    #[async_std::test]
    async fn owner_and_bypass() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();

        // the owner of node 1 may submit it for review
        let mut t = instance(1, "", "editorial_review", Agent::User(2));
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_review",
        );

        // but not publish it; the admin bypasses the rules
        let mut t = instance(1, "", "editorial_published", Agent::User(2));
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_review",
        );
        // a separate request, as the attempt above marked the transition
        let mut ctx = RequestContext::new();
        let mut t = instance(1, "", "editorial_published", Agent::User(3));
        assert_eq!(
            platform.execute_and_update_entity(&mut ctx, &mut t, false).await?,
            "editorial_published",
        );
        Ok(())
    }

    #[async_std::test]
    async fn new_content() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctx = RequestContext::new();
        let mut node = Content::new("node", 10, Some(2));
        let mut t = instance(10, "", "editorial_draft", Agent::User(2));
        assert_eq!(
            platform.execute_and_update_content(&mut ctx, &mut t, &mut node, false).await?,
            "editorial_draft",
        );
        assert_eq!(t.from_sid, "editorial_creation");
        assert_eq!(node.field_value("field_state").as_deref(), Some("editorial_draft"));
        let stored = platform.content.load_content(&EntityRef::new("node", 10)).await?
            .expect("content is saved");
        assert_eq!(stored.field_value("field_state").as_deref(), Some("editorial_draft"));
        Ok(())
    }
}
