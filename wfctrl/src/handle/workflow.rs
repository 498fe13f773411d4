use wfcore::workflow::Workflow;

use crate::platform::Platform;

/// Administrative operations on a single workflow: its states, its
/// transition rules and its settings.
pub struct WorkflowCtrl<'p> {
    pub(crate) platform: &'p Platform,
    pub(crate) workflow: Workflow,
}

mod impls;
