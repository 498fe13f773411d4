use async_trait::async_trait;
use crate::error::BackendError;
use super::{
    State,
    States,
};

#[async_trait]
pub trait StateBackend {
    async fn insert_state(
        &self,
        state: &State,
    ) -> Result<(), BackendError>;
    async fn get_state(
        &self,
        sid: &str,
    ) -> Result<Option<State>, BackendError>;
    /// All states of the workflow regardless of status, ordered by weight.
    async fn list_states(
        &self,
        workflow_id: &str,
    ) -> Result<States, BackendError>;
    /// Updates label, weight and active flag of an existing state.
    async fn update_state(
        &self,
        state: &State,
    ) -> Result<bool, BackendError>;
    async fn delete_state(
        &self,
        sid: &str,
    ) -> Result<bool, BackendError>;
}
