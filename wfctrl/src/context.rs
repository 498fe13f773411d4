use std::collections::HashMap;
use wfcore::{
    ac::Agent,
    rule::TransitionOption,
    transition::EntityRef,
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct MarkerKey {
    target: EntityRef,
    field_name: String,
    label: String,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct OptionsKey {
    target: EntityRef,
    field_name: String,
    from_sid: String,
    agent: Agent,
    force: bool,
}

/// State that lives for the duration of a single request or sweep.
///
/// Holds the markers of the transitions executed so far, which prevent
/// the same transition from being executed twice for an item, along
/// with the memoized transition options.  Create one at the start of a
/// request and drop it at the end.
#[derive(Debug, Default)]
pub struct RequestContext {
    markers: HashMap<MarkerKey, String>,
    options: HashMap<OptionsKey, Vec<TransitionOption>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn marker(
        &self,
        target: &EntityRef,
        field_name: &str,
        label: &str,
    ) -> Option<&str> {
        self.markers.get(&MarkerKey {
            target: target.clone(),
            field_name: field_name.to_string(),
            label: label.to_string(),
        }).map(String::as_str)
    }

    pub(crate) fn set_marker(
        &mut self,
        target: &EntityRef,
        field_name: &str,
        label: &str,
        sid: &str,
    ) {
        self.markers.insert(MarkerKey {
            target: target.clone(),
            field_name: field_name.to_string(),
            label: label.to_string(),
        }, sid.to_string());
    }

    pub(crate) fn options(
        &self,
        target: &EntityRef,
        field_name: &str,
        from_sid: &str,
        agent: &Agent,
        force: bool,
    ) -> Option<&Vec<TransitionOption>> {
        self.options.get(&OptionsKey {
            target: target.clone(),
            field_name: field_name.to_string(),
            from_sid: from_sid.to_string(),
            agent: *agent,
            force,
        })
    }

    pub(crate) fn set_options(
        &mut self,
        target: &EntityRef,
        field_name: &str,
        from_sid: &str,
        agent: &Agent,
        force: bool,
        options: Vec<TransitionOption>,
    ) {
        self.options.insert(OptionsKey {
            target: target.clone(),
            field_name: field_name.to_string(),
            from_sid: from_sid.to_string(),
            agent: *agent,
            force,
        }, options);
    }

    /// Forget the memoized options, e.g. after rules were edited.
    pub fn clear_options(&mut self) {
        self.options.clear();
    }

    pub fn executed_count(&self) -> usize {
        self.markers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        let mut ctx = RequestContext::new();
        let target = EntityRef::new("node", 1);
        assert_eq!(ctx.marker(&target, "field_state", "a-b"), None);
        ctx.set_marker(&target, "field_state", "a-b", "a");
        assert_eq!(ctx.marker(&target, "field_state", "a-b"), Some("a"));
        ctx.set_marker(&target, "field_state", "a-b", "b");
        assert_eq!(ctx.marker(&target, "field_state", "a-b"), Some("b"));
        assert_eq!(ctx.marker(&target, "field_other", "a-b"), None);
        assert_eq!(ctx.marker(&EntityRef::new("node", 2), "field_state", "a-b"), None);
        assert_eq!(ctx.executed_count(), 1);
    }

    #[test]
    fn options() {
        let mut ctx = RequestContext::new();
        let target = EntityRef::new("node", 1);
        let agent = Agent::User(1);
        let options = vec![TransitionOption {
            sid: "b".to_string(),
            label: "B".to_string(),
        }];
        ctx.set_options(&target, "field_state", "a", &agent, false, options.clone());
        assert_eq!(ctx.options(&target, "field_state", "a", &agent, false), Some(&options));
        assert_eq!(ctx.options(&target, "field_state", "a", &agent, true), None);
        assert_eq!(ctx.options(&target, "field_state", "a", &Agent::Anonymous, false), None);
        ctx.clear_options();
        assert_eq!(ctx.options(&target, "field_state", "a", &agent, false), None);
    }
}
