use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::error::TransitionError;

/// Reference to a content item.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TransitionStatus {
    #[default]
    New,
    Validated,
    Scheduled,
    Executed,
    Rejected(TransitionError),
    Discarded,
}

/// A concrete state change for one field of one content item.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransitionInstance {
    /// Zero until stored as a pending scheduled transition.
    pub id: i64,
    pub workflow_id: String,
    /// An empty from sid is resolved against the content on execution.
    pub from_sid: String,
    pub to_sid: String,
    pub target: EntityRef,
    pub field_name: String,
    pub uid: Option<i64>,
    pub timestamp: i64,
    pub comment: Option<String>,
    pub attached: BTreeMap<String, String>,
    pub scheduled: bool,
    pub executed: bool,
    pub forced: bool,
    #[serde(skip)]
    pub status: TransitionStatus,
}

mod impls;
