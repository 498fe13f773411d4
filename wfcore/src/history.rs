use serde::{Deserialize, Serialize};

/// An executed transition, as recorded in the audit trail.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HistoryRecord {
    pub hid: i64,
    pub workflow_id: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub field_name: String,
    pub from_sid: String,
    pub to_sid: String,
    pub uid: Option<i64>,
    pub timestamp: i64,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HistoryOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryQuery {
    pub entity_type: String,
    pub entity_ids: Vec<i64>,
    pub field_name: Option<String>,
    pub order: HistoryOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub mod traits;
mod impls;
