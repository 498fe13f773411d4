use std::{
    collections::HashSet,
    fmt,
    ops::Deref,
};
use crate::state::States;
use super::*;

impl TransitionRule {
    pub fn new(
        workflow_id: impl Into<String>,
        from_sid: impl Into<String>,
        to_sid: impl Into<String>,
    ) -> Self {
        let workflow_id = workflow_id.into();
        let from_sid = from_sid.into();
        let to_sid = to_sid.into();
        Self {
            id: Self::make_id(&workflow_id, &from_sid, &to_sid),
            workflow_id,
            from_sid,
            to_sid,
            label: None,
            roles: Roles::default(),
        }
    }

    /// Composes the rule id out of the workflow id and both state ids,
    /// dropping the workflow prefix the state ids already carry.
    pub fn make_id(workflow_id: &str, from_sid: &str, to_sid: &str) -> String {
        let strip = |sid: &str| sid.strip_prefix(workflow_id)
            .unwrap_or(sid)
            .to_string();
        let id = format!("{workflow_id}{}{}", strip(from_sid), strip(to_sid));
        match id.char_indices().nth(RULE_ID_MAX_LEN) {
            Some((idx, _)) => id[..idx].to_string(),
            None => id,
        }
    }

    pub fn roles(mut self, roles: impl Into<Roles>) -> Self {
        self.roles = roles.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn has_state_change(&self) -> bool {
        self.from_sid != self.to_sid
    }

    /// Whether an actor with the given roles may take this rule.
    pub fn is_allowed(&self, roles: &Roles, bypass: bool, force: bool) -> bool {
        force
            || bypass
            || !self.has_state_change()
            || self.roles.intersects(roles)
    }

    pub fn matches(&self, filter: &RuleFilter) -> bool {
        filter.from_sid.as_ref().map_or(true, |sid| *sid == self.from_sid)
            && filter.to_sid.as_ref().map_or(true, |sid| *sid == self.to_sid)
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "{} -> {}", self.from_sid, self.to_sid),
        }
    }
}

impl fmt::Display for TransitionOption {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.sid)
    }
}

impl TransitionRules {
    pub fn find(&self, from_sid: &str, to_sid: &str) -> Option<&TransitionRule> {
        self.0.iter()
            .find(|rule| rule.from_sid == from_sid && rule.to_sid == to_sid)
    }

    /// Keeps the rules whose from-state is active or the creation state,
    /// along with the rules without a from state, filters them and orders
    /// them by the weights of both endpoints.
    pub fn select(self, states: &States, filter: &RuleFilter) -> Self {
        let weight = |sid: &str| states.get(sid).map(|state| state.weight);
        let mut rules = self.0.into_iter()
            .filter(|rule| rule.from_sid.is_empty() || states.get(&rule.from_sid)
                .map(|state| state.active || state.creation)
                .unwrap_or(false)
            )
            .filter(|rule| rule.matches(filter))
            .collect::<Vec<_>>();
        rules.sort_by(|a, b| {
            weight(&a.from_sid).cmp(&weight(&b.from_sid))
                .then_with(|| weight(&a.to_sid).cmp(&weight(&b.to_sid)))
                .then_with(|| a.to_sid.cmp(&b.to_sid))
        });
        Self(rules)
    }

    /// The rules an item in `from_sid` may take, ordered by the weight of
    /// the to state.
    ///
    /// A rule without a from state applies to every state, unless the
    /// state has its own rule to the same to state.  Nothing applies to
    /// an inactive state.
    pub fn from_state(self, states: &States, from_sid: &str) -> Self {
        if !states.get(from_sid).map_or(false, |state| state.active || state.creation) {
            return Self::default();
        }
        let own = self.0.iter()
            .filter(|rule| rule.from_sid == from_sid)
            .map(|rule| rule.to_sid.clone())
            .collect::<HashSet<_>>();
        let weight = |sid: &str| states.get(sid).map(|state| state.weight);
        let mut rules = self.0.into_iter()
            .filter(|rule| rule.from_sid == from_sid
                || (rule.from_sid.is_empty() && !own.contains(&rule.to_sid))
            )
            .filter(|rule| states.get(&rule.to_sid).is_some())
            .collect::<Vec<_>>();
        rules.sort_by(|a, b| weight(&a.to_sid).cmp(&weight(&b.to_sid))
            .then_with(|| a.to_sid.cmp(&b.to_sid))
        );
        Self(rules)
    }

    pub fn into_inner(self) -> Vec<TransitionRule> {
        self.0
    }
}

impl Deref for TransitionRules {
    type Target = Vec<TransitionRule>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<TransitionRule>> for TransitionRules {
    fn from(rules: Vec<TransitionRule>) -> Self {
        Self(rules)
    }
}

impl FromIterator<TransitionRule> for TransitionRules {
    fn from_iter<I: IntoIterator<Item = TransitionRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TransitionRules {
    type Item = TransitionRule;
    type IntoIter = std::vec::IntoIter<TransitionRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
