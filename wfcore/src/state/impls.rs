use std::{
    cmp::Ordering,
    fmt,
    ops::Deref,
};
use super::*;

impl State {
    pub fn new(
        workflow_id: impl Into<String>,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            workflow_id: workflow_id.into(),
            label: label.into(),
            weight: 0,
            active: true,
            creation: false,
        }
    }

    /// The creation state of the workflow.
    pub fn creation(workflow_id: &str) -> Self {
        Self {
            id: Self::creation_sid(workflow_id),
            workflow_id: workflow_id.to_string(),
            label: "Creation".to_string(),
            weight: CREATION_STATE_WEIGHT,
            active: true,
            creation: true,
        }
    }

    pub fn creation_sid(workflow_id: &str) -> String {
        format!("{workflow_id}_{CREATION_STATE_NAME}")
    }

    /// Derives the machine name of a state from its label, prefixed by
    /// the workflow id.
    pub fn sid_from_label(workflow_id: &str, label: &str) -> String {
        let mut name = String::with_capacity(label.len());
        let mut gap = false;
        for c in label.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                name.push(c);
                gap = false;
            } else if !gap {
                name.push('_');
                gap = true;
            }
        }
        if name.is_empty() || name == "_" {
            name = "state".to_string();
        }
        format!("{workflow_id}_{name}")
    }

    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_creation_state(&self) -> bool {
        self.creation
    }

    pub fn matches(&self, filter: StateFilter) -> bool {
        match filter {
            StateFilter::All => true,
            StateFilter::Active => self.active && !self.creation,
            StateFilter::ActiveCreation => self.active || self.creation,
        }
    }

    /// Ordering by weight; the id breaks ties so the order is total.
    pub fn sort(a: &State, b: &State) -> Ordering {
        a.weight.cmp(&b.weight)
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl States {
    pub fn get(&self, sid: &str) -> Option<&State> {
        self.0.iter().find(|state| state.id == sid)
    }

    pub fn creation_state(&self) -> Option<&State> {
        self.0.iter().find(|state| state.creation)
    }

    pub fn filter(&self, filter: StateFilter) -> States {
        self.0.iter()
            .filter(|state| state.matches(filter))
            .cloned()
            .collect()
    }

    pub fn into_inner(self) -> Vec<State> {
        self.0
    }
}

impl Deref for States {
    type Target = Vec<State>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<State>> for States {
    fn from(mut states: Vec<State>) -> Self {
        states.sort_by(State::sort);
        Self(states)
    }
}

impl FromIterator<State> for States {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl IntoIterator for States {
    type Item = State;
    type IntoIter = std::vec::IntoIter<State>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
