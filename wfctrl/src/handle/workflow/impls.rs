use wfcore::{
    ac::{
        Agent,
        Roles,
    },
    content::WorkflowField,
    history::traits::HistoryBackend,
    rule::{
        RuleFilter,
        TransitionRule,
        TransitionRules,
        traits::RuleBackend,
    },
    state::{
        State,
        StateFilter,
        States,
        traits::StateBackend,
    },
    transition::{
        EntityRef,
        TransitionInstance,
    },
    workflow::{
        Workflow,
        WorkflowSettings,
        traits::WorkflowBackend,
    },
};

use crate::{
    chrono::Utc,
    context::RequestContext,
    error::{
        CtrlError,
        PlatformError,
    },
    handle::WorkflowCtrl,
    platform::{
        Platform,
        PurgeReport,
    },
};

impl<'p> WorkflowCtrl<'p> {
    pub(crate) fn new(platform: &'p Platform, workflow: Workflow) -> Self {
        Self { platform, workflow }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn into_inner(self) -> Workflow {
        self.workflow
    }

    pub async fn update_settings(
        &mut self,
        settings: WorkflowSettings,
    ) -> Result<(), PlatformError> {
        if !self.platform.wf_platform
            .update_workflow_settings(&self.workflow.id, &settings)
            .await?
        {
            Err(CtrlError::UnknownWorkflow(self.workflow.id.clone()))?
        }
        self.workflow.settings = settings;
        Ok(())
    }

    /// Returns the creation state, creating it if needed.  Nothing is
    /// created for a bulk import, which brings its own states.
    pub async fn create_creation_state(
        &self,
        bulk_import: bool,
    ) -> Result<Option<State>, PlatformError> {
        if bulk_import {
            log::debug!("bulk import of workflow {}; no creation state created", self.workflow.id);
            return Ok(None);
        }
        if let Some(state) = self.get_creation_state().await? {
            return Ok(Some(state));
        }
        let state = State::creation(&self.workflow.id);
        self.platform.wf_platform.insert_state(&state).await?;
        log::info!("created creation state {} for workflow {}", state.id, self.workflow.id);
        Ok(Some(state))
    }

    pub async fn get_creation_state(&self) -> Result<Option<State>, PlatformError> {
        Ok(self.platform.wf_platform.list_states(&self.workflow.id).await?
            .creation_state()
            .cloned())
    }

    pub async fn get_states(&self, filter: StateFilter) -> Result<States, PlatformError> {
        Ok(self.platform.wf_platform.list_states(&self.workflow.id).await?
            .filter(filter))
    }

    pub async fn get_state(&self, sid: &str) -> Result<State, PlatformError> {
        Ok(self.platform.wf_platform.list_states(&self.workflow.id).await?
            .get(sid)
            .cloned()
            .ok_or_else(|| CtrlError::UnknownState(sid.to_string()))?)
    }

    /// Adds a state named by its label; an existing state with the same
    /// machine name is returned unchanged.
    pub async fn create_state(
        &self,
        label: &str,
        weight: i64,
    ) -> Result<State, PlatformError> {
        let sid = State::sid_from_label(&self.workflow.id, label);
        if sid == State::creation_sid(&self.workflow.id) {
            Err(CtrlError::CreationState(sid.clone()))?
        }
        if let Some(state) = self.platform.wf_platform.get_state(&sid).await? {
            return Ok(state);
        }
        let state = State::new(&self.workflow.id, sid, label).weight(weight);
        self.platform.wf_platform.insert_state(&state).await?;
        log::info!("created state {} for workflow {}", state.id, self.workflow.id);
        Ok(state)
    }

    pub async fn update_state(
        &self,
        sid: &str,
        label: Option<&str>,
        weight: Option<i64>,
    ) -> Result<State, PlatformError> {
        let mut state = self.get_state(sid).await?;
        if let Some(label) = label {
            state.label = label.to_string();
        }
        if let Some(weight) = weight {
            if state.creation {
                Err(CtrlError::CreationState(state.id.clone()))?
            }
            state.weight = weight;
        }
        self.platform.wf_platform.update_state(&state).await?;
        Ok(state)
    }

    /// Takes the state out of use.
    ///
    /// Content in the state is first moved to `reassign_to` through
    /// forced transitions, then all rules touching the state are dropped.
    /// Returns the number of items moved.
    pub async fn deactivate_state(
        &self,
        ctx: &mut RequestContext,
        sid: &str,
        reassign_to: Option<&str>,
        agent: Agent,
    ) -> Result<usize, PlatformError> {
        let mut state = self.get_state(sid).await?;
        if state.creation {
            Err(CtrlError::CreationState(state.id.clone()))?
        }
        let mut moved = 0;
        if let Some(reassign_to) = reassign_to {
            let target = self.get_state(reassign_to).await
                .ok()
                .filter(|target| target.active && target.id != state.id)
                .ok_or_else(|| CtrlError::UnknownState(reassign_to.to_string()))?;
            if target.creation {
                Err(CtrlError::CreationState(target.id.clone()))?
            }
            for field in self.fields().await?.into_iter() {
                let ids = self.platform.content.list_content_in_state(
                    &field.entity_type,
                    &field.field_name,
                    &state.id,
                ).await?;
                for entity_id in ids.into_iter() {
                    let mut instance = TransitionInstance::new(
                        &self.workflow.id,
                        EntityRef::new(&field.entity_type, entity_id),
                        &field.field_name,
                        &state.id,
                        &target.id,
                        agent,
                        Utc::now().timestamp(),
                    )
                        .comment("Previous state deleted")
                        .force(true);
                    if self.platform
                        .execute_and_update_entity(ctx, &mut instance, true)
                        .await? == target.id
                    {
                        moved += 1;
                    }
                }
            }
        }

        for rule in self.rules_touching(&state.id).await?.into_iter() {
            self.platform.wf_platform.delete_rule(&rule.id).await?;
        }
        state.active = false;
        self.platform.wf_platform.update_state(&state).await?;
        log::info!("deactivated state {} of workflow {}; {moved} item(s) moved", state.id, self.workflow.id);
        Ok(moved)
    }

    /// Removes an inactive state for good, along with the remaining rules
    /// and the history referencing it.
    pub async fn purge_state(&self, sid: &str) -> Result<PurgeReport, PlatformError> {
        let state = self.get_state(sid).await?;
        if state.active {
            Err(CtrlError::StateActive(state.id.clone()))?
        }
        let mut report = PurgeReport::default();
        for rule in self.rules_touching(&state.id).await?.into_iter() {
            if self.platform.wf_platform.delete_rule(&rule.id).await? {
                report.rules += 1;
            }
        }
        report.history = self.platform.wf_platform.purge_history_by_sid(&state.id).await?;
        self.platform.wf_platform.delete_state(&state.id).await?;
        log::info!(
            "purged state {}: {} rule(s), {} history record(s)",
            state.id,
            report.rules,
            report.history,
        );
        Ok(report)
    }

    async fn rules_touching(&self, sid: &str) -> Result<Vec<TransitionRule>, PlatformError> {
        Ok(self.platform.wf_platform.list_rules(&self.workflow.id).await?
            .into_iter()
            .filter(|rule| rule.from_sid == sid || rule.to_sid == sid)
            .collect())
    }

    /// Returns the rule for the pair, creating it if it doesn't exist.
    /// An empty `from_sid` stands for any state.
    pub async fn create_rule(
        &self,
        from_sid: &str,
        to_sid: &str,
    ) -> Result<TransitionRule, PlatformError> {
        let states = self.platform.wf_platform.list_states(&self.workflow.id).await?;
        match states.get(to_sid) {
            None => Err(CtrlError::InvalidRule(format!("unknown to state `{to_sid}`")))?,
            Some(state) if state.creation => Err(CtrlError::InvalidRule(
                format!("to state `{to_sid}` is the creation state")
            ))?,
            Some(_) => (),
        }
        if !from_sid.is_empty() && states.get(from_sid).is_none() {
            Err(CtrlError::InvalidRule(format!("unknown from state `{from_sid}`")))?
        }

        let rules = self.platform.wf_platform.list_rules(&self.workflow.id).await?;
        if let Some(rule) = rules.find(from_sid, to_sid) {
            return Ok(rule.clone());
        }
        let rule = TransitionRule::new(&self.workflow.id, from_sid, to_sid);
        self.platform.wf_platform.insert_rule(&rule).await?;
        log::info!("created rule {} for workflow {}", rule.id, self.workflow.id);
        Ok(rule)
    }

    /// The rules out of active states (and the creation state), in
    /// weight order.
    pub async fn get_rules(&self, filter: &RuleFilter) -> Result<TransitionRules, PlatformError> {
        let states = self.platform.wf_platform.list_states(&self.workflow.id).await?;
        Ok(self.platform.wf_platform.list_rules(&self.workflow.id).await?
            .select(&states, filter))
    }

    pub async fn get_rule(&self, id: &str) -> Result<TransitionRule, PlatformError> {
        Ok(self.platform.wf_platform.get_rule(id).await?
            .filter(|rule| rule.workflow_id == self.workflow.id)
            .ok_or_else(|| CtrlError::UnknownRule(id.to_string()))?)
    }

    pub async fn set_rule_roles(
        &self,
        id: &str,
        roles: Roles,
    ) -> Result<TransitionRule, PlatformError> {
        let rule = self.get_rule(id).await?.roles(roles);
        self.platform.wf_platform.update_rule(&rule).await?;
        Ok(rule)
    }

    pub async fn set_rule_label(
        &self,
        id: &str,
        label: Option<&str>,
    ) -> Result<TransitionRule, PlatformError> {
        let mut rule = self.get_rule(id).await?;
        rule.label = label.map(str::to_string);
        self.platform.wf_platform.update_rule(&rule).await?;
        Ok(rule)
    }

    /// A usable workflow has an active state and a way out of the
    /// creation state.
    pub async fn is_valid(&self) -> Result<bool, PlatformError> {
        let mut valid = true;
        if self.get_states(StateFilter::Active).await?.is_empty() {
            log::warn!("workflow {} has no active states", self.workflow.id);
            valid = false;
        }
        let creation_sid = State::creation_sid(&self.workflow.id);
        let filter = RuleFilter {
            from_sid: Some(creation_sid),
            .. Default::default()
        };
        if self.get_rules(&filter).await?.is_empty() {
            log::warn!("workflow {} has no transitions out of the creation state", self.workflow.id);
            valid = false;
        }
        Ok(valid)
    }

    pub async fn fields(&self) -> Result<Vec<WorkflowField>, PlatformError> {
        self.platform.list_fields(Some(&self.workflow.id)).await
    }
}

#[cfg(test)]
mod tests {
    use wfcore::{
        ac::{
            Agent,
            Roles,
        },
        content::{
            ContentItem,
            traits::ContentBackend,
        },
        history::HistoryQuery,
        rule::{
            RuleFilter,
            traits::RuleBackend,
        },
        state::StateFilter,
        transition::EntityRef,
        workflow::{
            ActionStyle,
            WorkflowSettings,
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
    async fn creation_state_once() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let ctrl = platform.get_workflow("editorial").await?;
        let first = ctrl.create_creation_state(false).await?
            .expect("creation state");
        let second = ctrl.create_creation_state(false).await?
            .expect("creation state");
        assert_eq!(first, second);
        assert_eq!(first.id, "editorial_creation");
        assert_eq!(first.weight, -50);
        assert_eq!(ctrl.create_creation_state(true).await?, None);
        let all = ctrl.get_states(StateFilter::All).await?;
        assert_eq!(all.iter().filter(|state| state.creation).count(), 1);
        Ok(())
    }

    #[async_std::test]
    async fn states() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let ctrl = platform.get_workflow("editorial").await?;
        let archived = ctrl.create_state("Archived!", 10).await?;
        assert_eq!(archived.id, "editorial_archived_");
        // same machine name, so the existing state comes back
        let again = ctrl.create_state("archived?", 0).await?;
        assert_eq!(again, archived);

        let active = ctrl.get_states(StateFilter::Active).await?;
        let ids = active.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, &[
            "editorial_draft",
            "editorial_review",
            "editorial_published",
            "editorial_archived_",
        ]);
        assert_eq!(ctrl.get_states(StateFilter::ActiveCreation).await?.len(), 5);

        let state = ctrl.update_state("editorial_archived_", Some("Archive"), Some(0)).await?;
        assert_eq!(state.label, "Archive");
        assert_eq!(ctrl.get_states(StateFilter::Active).await?[0].id, "editorial_archived_");
        assert!(matches!(
            ctrl.update_state("editorial_creation", None, Some(5)).await,
            Err(PlatformError::CtrlError(CtrlError::CreationState(_))),
        ));
        assert!(matches!(
            ctrl.get_state("editorial_unknown").await,
            Err(PlatformError::CtrlError(CtrlError::UnknownState(_))),
        ));
        // a label may not name the creation state
        assert!(matches!(
            ctrl.create_state("Creation", 1).await,
            Err(PlatformError::CtrlError(CtrlError::CreationState(_))),
        ));
        assert_eq!(ctrl.get_states(StateFilter::ActiveCreation).await?.len(), 5);
        Ok(())
    }

    #[async_std::test]
    async fn rules() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let ctrl = platform.get_workflow("editorial").await?;

        let rule = ctrl.create_rule("editorial_draft", "editorial_published").await?;
        assert_eq!(rule.id, "editorial_draft_published");
        let again = ctrl.create_rule("editorial_draft", "editorial_published").await?;
        assert_eq!(rule.id, again.id);

        let rule = ctrl.set_rule_roles(&rule.id, Roles::from(["editor"])).await?;
        let rule = ctrl.set_rule_label(&rule.id, Some("Publish now")).await?;
        let stored = ctrl.get_rule(&rule.id).await?;
        assert_eq!(stored.label.as_deref(), Some("Publish now"));
        assert!(stored.roles.contains("editor"));

        assert!(matches!(
            ctrl.create_rule("editorial_draft", "editorial_creation").await,
            Err(PlatformError::CtrlError(CtrlError::InvalidRule(_))),
        ));
        assert!(matches!(
            ctrl.create_rule("editorial_draft", "editorial_missing").await,
            Err(PlatformError::CtrlError(CtrlError::InvalidRule(_))),
        ));
        assert!(matches!(
            ctrl.create_rule("editorial_missing", "editorial_draft").await,
            Err(PlatformError::CtrlError(CtrlError::InvalidRule(_))),
        ));
        assert!(matches!(
            ctrl.get_rule("other_rule").await,
            Err(PlatformError::CtrlError(CtrlError::UnknownRule(_))),
        ));

        let out_of_draft = ctrl.get_rules(&RuleFilter {
            from_sid: Some("editorial_draft".to_string()),
            .. Default::default()
        }).await?;
        let to = out_of_draft.iter().map(|r| r.to_sid.as_str()).collect::<Vec<_>>();
        assert_eq!(to, &["editorial_draft", "editorial_review", "editorial_published"]);
        Ok(())
    }

    #[async_std::test]
    async fn settings_and_validity() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let mut ctrl = platform.get_workflow("editorial").await?;
        assert!(ctrl.is_valid().await?);
        ctrl.update_settings(WorkflowSettings {
            options: ActionStyle::Buttons,
            .. Default::default()
        }).await?;
        assert_eq!(
            platform.get_workflow("editorial").await?.workflow().settings.options,
            ActionStyle::Buttons,
        );

        let bare = platform.create_workflow("bare", "Bare", Default::default(), false).await?;
        assert!(!bare.is_valid().await?);
        bare.create_state("Open", 0).await?;
        assert!(!bare.is_valid().await?);
        bare.create_rule("bare_creation", "bare_open").await?;
        assert!(bare.is_valid().await?);
        Ok(())
    }

    #[async_std::test]
    async fn deactivate_and_purge() -> anyhow::Result<()> {
        let platform = create_sqlite_platform().await?;
        let ctrl = platform.get_workflow("editorial").await?;
        let mut ctx = RequestContext::new();

        assert!(matches!(
            ctrl.deactivate_state(&mut ctx, "editorial_creation", None, Agent::User(3)).await,
            Err(PlatformError::CtrlError(CtrlError::CreationState(_))),
        ));
        assert!(matches!(
            ctrl.deactivate_state(&mut ctx, "editorial_review", Some("editorial_gone"), Agent::User(3)).await,
            Err(PlatformError::CtrlError(CtrlError::UnknownState(_))),
        ));
        assert!(matches!(
            ctrl.purge_state("editorial_review").await,
            Err(PlatformError::CtrlError(CtrlError::StateActive(_))),
        ));

        // node 2 sits in review
        let moved = ctrl.deactivate_state(
            &mut ctx,
            "editorial_review",
            Some("editorial_draft"),
            Agent::User(3),
        ).await?;
        assert_eq!(moved, 1);
        let node = platform.content.load_content(&EntityRef::new("node", 2)).await?
            .expect("fixture has node 2");
        assert_eq!(node.field_value("field_state").as_deref(), Some("editorial_draft"));
        let history = platform.find_history(&HistoryQuery::new("node", vec![2])).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].comment.as_deref(), Some("Previous state deleted"));

        let state = ctrl.get_state("editorial_review").await?;
        assert!(!state.active);
        let rules = platform.wf_platform.list_rules("editorial").await?;
        assert!(rules.iter().all(|rule| {
            rule.from_sid != "editorial_review" && rule.to_sid != "editorial_review"
        }));

        let report = ctrl.purge_state("editorial_review").await?;
        assert_eq!(report.rules, 0);
        assert_eq!(report.history, 1);
        assert!(ctrl.get_state("editorial_review").await.is_err());
        Ok(())
    }
}
