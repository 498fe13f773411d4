use std::fmt;
use wfcore::{
    ac::Agent,
    transition::TransitionInstance,
};

/// Invoked before a state change is applied.  Returning an error vetoes
/// the transition; the message is recorded as the reason.
pub trait PreTransitionHook: Send + Sync {
    fn pre_transition(
        &self,
        instance: &TransitionInstance,
        agent: &Agent,
    ) -> Result<(), String>;
}

/// Invoked right before an immediate transition is recorded, with the
/// chance to rewrite its comment.
pub trait CommentAlterHook: Send + Sync {
    fn alter_comment(
        &self,
        comment: &mut Option<String>,
        instance: &TransitionInstance,
    );
}

impl<F> PreTransitionHook for F
where
    F: Fn(&TransitionInstance, &Agent) -> Result<(), String> + Send + Sync,
{
    fn pre_transition(
        &self,
        instance: &TransitionInstance,
        agent: &Agent,
    ) -> Result<(), String> {
        self(instance, agent)
    }
}

impl<F> CommentAlterHook for F
where
    F: Fn(&mut Option<String>, &TransitionInstance) + Send + Sync,
{
    fn alter_comment(
        &self,
        comment: &mut Option<String>,
        instance: &TransitionInstance,
    ) {
        self(comment, instance)
    }
}

/// The ordered lists of hooks consulted by the engine.
#[derive(Default)]
pub struct HookRegistry {
    pre_transition: Vec<Box<dyn PreTransitionHook>>,
    comment_alter: Vec<Box<dyn CommentAlterHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre_transition(mut self, hook: impl PreTransitionHook + 'static) -> Self {
        self.pre_transition.push(Box::new(hook));
        self
    }

    pub fn on_pre_transition<F>(self, f: F) -> Self
    where
        F: Fn(&TransitionInstance, &Agent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.pre_transition(f)
    }

    pub fn comment_alter(mut self, hook: impl CommentAlterHook + 'static) -> Self {
        self.comment_alter.push(Box::new(hook));
        self
    }

    pub fn on_comment_alter<F>(self, f: F) -> Self
    where
        F: Fn(&mut Option<String>, &TransitionInstance) + Send + Sync + 'static,
    {
        self.comment_alter(f)
    }

    /// Runs the pre-transition hooks in order, stopping at the first veto.
    pub fn check(
        &self,
        instance: &TransitionInstance,
        agent: &Agent,
    ) -> Result<(), String> {
        self.pre_transition.iter()
            .try_for_each(|hook| hook.pre_transition(instance, agent))
    }

    pub fn alter_comment(&self, instance: &mut TransitionInstance) {
        if self.comment_alter.is_empty() {
            return;
        }
        let mut comment = instance.comment.take();
        for hook in self.comment_alter.iter() {
            hook.alter_comment(&mut comment, instance);
        }
        instance.comment = comment;
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("pre_transition", &self.pre_transition.len())
            .field("comment_alter", &self.comment_alter.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use wfcore::transition::EntityRef;
    use super::*;

    fn instance() -> TransitionInstance {
        TransitionInstance::new(
            "wf",
            EntityRef::new("node", 1),
            "field_state",
            "wf_a",
            "wf_b",
            Agent::User(1),
            0,
        )
    }

    struct Deny;

    impl PreTransitionHook for Deny {
        fn pre_transition(
            &self,
            _instance: &TransitionInstance,
            agent: &Agent,
        ) -> Result<(), String> {
            match agent {
                Agent::Anonymous => Err("anonymous".to_string()),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn veto_in_order() {
        let hooks = HookRegistry::new()
            .pre_transition(Deny)
            .on_pre_transition(|t: &TransitionInstance, _: &Agent| {
                (t.to_sid != "wf_b").then_some(()).ok_or("no wf_b".to_string())
            });
        let t = instance();
        assert_eq!(hooks.check(&t, &Agent::Anonymous), Err("anonymous".to_string()));
        assert_eq!(hooks.check(&t, &Agent::User(1)), Err("no wf_b".to_string()));
        assert_eq!(HookRegistry::new().check(&t, &Agent::Anonymous), Ok(()));
    }

    #[test]
    fn comments() {
        let hooks = HookRegistry::new()
            .on_comment_alter(|comment: &mut Option<String>, t: &TransitionInstance| {
                let text = comment.take().unwrap_or_default();
                *comment = Some(format!("[{}] {text}", t.to_sid));
            })
            .on_comment_alter(|comment: &mut Option<String>, _: &TransitionInstance| {
                if let Some(c) = comment.as_mut() {
                    c.push('!');
                }
            });
        let mut t = instance().comment("done");
        hooks.alter_comment(&mut t);
        assert_eq!(t.comment.as_deref(), Some("[wf_b] done!"));
    }
}
