use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Workflow {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub settings: WorkflowSettings,
}

/// How the transition choices are presented to interactive callers.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    #[default]
    Radios,
    Buttons,
    Dropbutton,
    Select,
}

/// Per-workflow behaviour.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Wrap the transition widget in a fieldset.
    pub fieldset: bool,
    pub options: ActionStyle,
    pub schedule_enable: bool,
    pub comment_required: bool,
    /// Touch the changed time of the content item on every transition.
    pub always_update_entity: bool,
    /// Log executed transitions at info level rather than debug.
    pub watchdog_log: bool,
}

pub mod traits;
mod impls;
