use async_trait::async_trait;
use crate::error::BackendError;
use super::{
    Workflow,
    WorkflowSettings,
};

#[async_trait]
pub trait WorkflowBackend {
    async fn add_workflow(
        &self,
        workflow: &Workflow,
    ) -> Result<(), BackendError>;
    async fn get_workflow(
        &self,
        id: &str,
    ) -> Result<Option<Workflow>, BackendError>;
    async fn list_workflows(
        &self,
    ) -> Result<Vec<Workflow>, BackendError>;
    async fn update_workflow_settings(
        &self,
        id: &str,
        settings: &WorkflowSettings,
    ) -> Result<bool, BackendError>;
}
