mod workflow;

pub use workflow::WorkflowCtrl;
