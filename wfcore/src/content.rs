use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::transition::EntityRef;

/// The narrow view of a content item the engine works through.
pub trait ContentItem: Send + Sync {
    fn entity_ref(&self) -> EntityRef;
    fn field_value(&self, field_name: &str) -> Option<String>;
    fn set_field_value(&mut self, field_name: &str, sid: &str);
    fn field_names(&self) -> Vec<String>;
    fn owner_id(&self) -> Option<i64>;
    /// True for items that were never saved.
    fn is_new(&self) -> bool;
    fn changed_time(&self) -> i64;
    fn set_changed_time(&mut self, timestamp: i64);
}

/// A general purpose content item holding its state fields in a map.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Content {
    pub entity_type: String,
    pub entity_id: i64,
    pub owner_id: Option<i64>,
    pub changed: i64,
    pub fields: BTreeMap<String, String>,
    #[serde(skip)]
    pub new: bool,
}

/// Binds a field of an entity type to a workflow.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WorkflowField {
    pub entity_type: String,
    pub field_name: String,
    pub workflow_id: String,
}

pub mod traits;
mod impls;
