use async_trait::async_trait;
use crate::{
    error::BackendError,
    transition::EntityRef,
};
use super::{
    ContentItem,
    WorkflowField,
};

/// The content store the engine reads states from and writes them to.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    async fn load_content(
        &self,
        target: &EntityRef,
    ) -> Result<Option<Box<dyn ContentItem>>, BackendError>;
    /// Stores the item along with all its fields.  Returns false if the
    /// store refused the item.
    async fn save_content(
        &self,
        content: &dyn ContentItem,
    ) -> Result<bool, BackendError>;
    /// Ids of the items of the entity type whose field holds the state.
    async fn list_content_in_state(
        &self,
        entity_type: &str,
        field_name: &str,
        sid: &str,
    ) -> Result<Vec<i64>, BackendError>;
}

#[async_trait]
pub trait FieldBackend {
    async fn bind_field(
        &self,
        field: &WorkflowField,
    ) -> Result<(), BackendError>;
    async fn get_field(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Option<WorkflowField>, BackendError>;
    /// All bindings, or those of a single workflow.
    async fn list_fields(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowField>, BackendError>;
}
