use serde::{Deserialize, Serialize};
use crate::ac::Roles;

/// Maximum length of a composed rule id.
pub const RULE_ID_MAX_LEN: usize = 166;

/// An allowed from→to pair within a workflow, gated by roles.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransitionRule {
    pub id: String,
    pub workflow_id: String,
    /// The empty string stands for "any state".
    pub from_sid: String,
    pub to_sid: String,
    pub label: Option<String>,
    pub roles: Roles,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransitionRules(Vec<TransitionRule>);

/// A to-state an actor may choose, labelled for presentation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransitionOption {
    pub sid: String,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleFilter {
    pub from_sid: Option<String>,
    pub to_sid: Option<String>,
}

pub mod traits;
mod impls;
