use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a transition did not take effect.
///
/// These are business outcomes rather than faults: the engine records
/// them on the instance and logs them, and callers only ever observe the
/// unchanged state id.
#[derive(Clone, Debug, Error, PartialEq, Deserialize, Serialize)]
pub enum TransitionError {
    #[error("no content item found for {0}")]
    MissingEntity(String),
    #[error("from state `{0}` is not a state of this workflow")]
    InvalidFromState(String),
    #[error("to state `{0}` is not a state of this workflow")]
    InvalidToState(String),
    #[error("user {user} not allowed to go from state {from_sid} to {to_sid}")]
    Unauthorized {
        user: String,
        from_sid: String,
        to_sid: String,
    },
    #[error("transition vetoed: {0}")]
    Vetoed(String),
    #[error("entity has state `{current}` instead of expected `{expected}`")]
    Drifted {
        current: String,
        expected: String,
    },
    #[error("transition {0} already executed in this request")]
    AlreadyExecuted(String),
    #[error("content item {0} could not be saved")]
    SaveFailed(String),
}
