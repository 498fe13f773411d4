use wfcore::error::{
    BackendError,
    ValueError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    BackendError(#[from] BackendError),
    #[error(transparent)]
    CtrlError(#[from] CtrlError),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    RbacError(#[from] wfrbac::error::Error),
    #[error(transparent)]
    ValueError(#[from] ValueError),
}

impl From<sqlx::Error> for PlatformError {
    fn from(error: sqlx::Error) -> Self {
        Self::BackendError(error.into())
    }
}

/// Misuse of the administrative and engine operations.
#[derive(Debug, PartialEq, Error)]
pub enum CtrlError {
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),
    #[error("unknown state: {0}")]
    UnknownState(String),
    #[error("unknown transition rule: {0}")]
    UnknownRule(String),
    #[error("unknown history record: {0}")]
    UnknownHistory(i64),
    #[error("no workflow bound to field {field_name} of {entity_type}")]
    UnboundField {
        entity_type: String,
        field_name: String,
    },
    #[error("invalid transition rule: {0}")]
    InvalidRule(String),
    #[error("workflow already exists: {0}")]
    WorkflowExists(String),
    /// The creation state may not be deactivated or removed.
    #[error("creation state cannot be changed: {0}")]
    CreationState(String),
    #[error("state is still active: {0}")]
    StateActive(String),
    #[error("history record {0} cannot be reverted")]
    NotRevertible(i64),
}
