use serde::{Deserialize, Serialize};

/// Machine name suffix of the creation state.
pub const CREATION_STATE_NAME: &str = "creation";
/// Weight of the creation state so that it always sorts first.
pub const CREATION_STATE_WEIGHT: i64 = -50;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct State {
    pub id: String,
    pub workflow_id: String,
    pub label: String,
    pub weight: i64,
    pub active: bool,
    pub creation: bool,
}

/// States of a single workflow, ordered by weight.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct States(Vec<State>);

/// Selection for listing the states of a workflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum StateFilter {
    All,
    /// Active states without the creation state.
    #[default]
    Active,
    /// Active states plus the creation state.
    ActiveCreation,
}

pub mod traits;
mod impls;
