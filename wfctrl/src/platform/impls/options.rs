use wfcore::{
    ac::{
        Agent,
        traits::bypass_capability,
    },
    content::ContentItem,
    rule::{
        TransitionOption,
        traits::RuleBackend,
    },
    state::{
        State,
        StateFilter,
        traits::StateBackend,
    },
};

use crate::{
    context::RequestContext,
    error::PlatformError,
    platform::Platform,
};

impl Platform {
    /// The to states the agent may pick from `from_sid`, in rule order.
    ///
    /// An empty `from_sid` lists every active state including the
    /// creation state.  Results are memoized in the request context.
    pub async fn get_options(
        &self,
        ctx: &mut RequestContext,
        content: &dyn ContentItem,
        field_name: &str,
        agent: &Agent,
        from_sid: &str,
        force: bool,
    ) -> Result<Vec<TransitionOption>, PlatformError> {
        let target = content.entity_ref();
        if let Some(options) = ctx.options(&target, field_name, from_sid, agent, force) {
            log::debug!("reusing options for {target} [{field_name}] from `{from_sid}`");
            return Ok(options.clone());
        }

        let workflow = self.bound_workflow(&target.entity_type, field_name).await?;
        let states = self.wf_platform.list_states(&workflow.id).await?;
        let options = if from_sid.is_empty() {
            states.filter(StateFilter::ActiveCreation)
                .iter()
                .map(|state| TransitionOption {
                    sid: state.id.clone(),
                    label: state.label.clone(),
                })
                .collect::<Vec<_>>()
        } else {
            let bypass = force || self.resolver.has_capability(
                agent,
                &bypass_capability(&workflow.id),
            );
            let roles = self.agent_roles(agent, content);
            self.wf_platform.list_rules(&workflow.id).await?
                .from_state(&states, from_sid)
                .iter()
                .filter(|rule| rule.is_allowed(&roles, bypass, force))
                .filter_map(|rule| states.get(&rule.to_sid).map(|state| TransitionOption {
                    sid: state.id.clone(),
                    label: rule.label.clone().unwrap_or_else(|| state.label.clone()),
                }))
                .collect::<Vec<_>>()
        };

        ctx.set_options(&target, field_name, from_sid, agent, force, options.clone());
        Ok(options)
    }

    /// The state following the current one among the options of the
    /// agent, for advancing items one step at a time.
    ///
    /// From the creation state this is the first option.  The current
    /// sid is returned when no option follows it.
    pub async fn get_next_sid(
        &self,
        ctx: &mut RequestContext,
        content: &dyn ContentItem,
        field_name: &str,
        agent: &Agent,
        force: bool,
    ) -> Result<String, PlatformError> {
        let workflow = self.bound_workflow(&content.entity_ref().entity_type, field_name).await?;
        let current = self.current_sid(&workflow.id, content, field_name).await?;
        let options = self.get_options(ctx, content, field_name, agent, &current, force).await?;
        let creation = current == State::creation_sid(&workflow.id);

        let mut found = false;
        for option in options.into_iter() {
            if (creation && option.sid != current) || found {
                return Ok(option.sid);
            }
            found = option.sid == current;
        }
        Ok(current)
    }

    /// The first state the agent may move a new item into.
    pub async fn get_first_sid(
        &self,
        ctx: &mut RequestContext,
        content: &dyn ContentItem,
        field_name: &str,
        agent: &Agent,
        force: bool,
    ) -> Result<Option<String>, PlatformError> {
        let workflow = self.bound_workflow(&content.entity_ref().entity_type, field_name).await?;
        let creation_sid = State::creation_sid(&workflow.id);
        let options = self.get_options(ctx, content, field_name, agent, &creation_sid, force).await?;
        if options.is_empty() {
            log::error!("no states available from the creation state of workflow {}", workflow.id);
        }
        Ok(options.into_iter().next().map(|option| option.sid))
    }
}
