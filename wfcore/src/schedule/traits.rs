use async_trait::async_trait;
use crate::{
    error::BackendError,
    transition::{
        EntityRef,
        TransitionInstance,
    },
};

/// Storage for pending scheduled transitions.
#[async_trait]
pub trait ScheduleBackend {
    /// Stores the instance and returns its newly assigned id.
    async fn insert_scheduled(
        &self,
        instance: &TransitionInstance,
    ) -> Result<i64, BackendError>;
    async fn get_scheduled_for(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<TransitionInstance>, BackendError>;
    async fn delete_scheduled_for(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<u64, BackendError>;
    async fn delete_scheduled(
        &self,
        id: i64,
    ) -> Result<bool, BackendError>;
    /// Pending instances with a timestamp at or before `now`, oldest first.
    async fn list_due(
        &self,
        now: i64,
    ) -> Result<Vec<TransitionInstance>, BackendError>;
}
