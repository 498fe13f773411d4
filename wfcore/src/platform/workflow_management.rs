use async_trait::async_trait;
use crate::{
    content::traits::FieldBackend,
    error::BackendError,
    history::traits::HistoryBackend,
    platform::PlatformUrl,
    rule::traits::RuleBackend,
    schedule::traits::ScheduleBackend,
    state::traits::StateBackend,
    workflow::{
        Workflow,
        traits::WorkflowBackend,
    },
};

/// WFPlatform - Workflow Platform
///
/// Provides the storage the workflow engine owns: the workflow
/// definitions with their states and rules, the history, the pending
/// scheduled transitions and the field bindings.  Content items are
/// provided separately through a `ContentBackend`.
///
/// This trait is applicable to everything that correctly implements the
/// relevant backends that compose this trait.
#[async_trait]
pub trait WFPlatform: WorkflowBackend
    + StateBackend
    + RuleBackend
    + HistoryBackend
    + ScheduleBackend
    + FieldBackend
    + PlatformUrl

    + Send
    + Sync
{
    fn as_dyn(&self) -> &dyn WFPlatform;

    /// The workflow bound to the field of the entity type, if any.
    async fn workflow_for_field(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Option<Workflow>, BackendError> {
        match FieldBackend::get_field(self, entity_type, field_name).await? {
            Some(field) => WorkflowBackend::get_workflow(self, &field.workflow_id).await,
            None => Ok(None),
        }
    }
}

pub trait DefaultWFPlatform: WFPlatform {}

impl<P: WorkflowBackend
    + StateBackend
    + RuleBackend
    + HistoryBackend
    + ScheduleBackend
    + FieldBackend
    + PlatformUrl

    + DefaultWFPlatform

    + Send
    + Sync
> WFPlatform for P {
    fn as_dyn(&self) -> &dyn WFPlatform {
        self
    }
}
