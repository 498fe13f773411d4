use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wfcore::{
    ac::traits::RoleResolver,
    content::{
        WorkflowField,
        traits::{
            ContentBackend,
            FieldBackend,
        },
    },
    platform::WFPlatform,
    workflow::{
        Workflow,
        WorkflowSettings,
        traits::WorkflowBackend,
    },
};

use crate::{
    error::{
        CtrlError,
        PlatformError,
    },
    handle::WorkflowCtrl,
    hook::HookRegistry,
    platform::Platform,
};

/// Outcome of a sweep over the due scheduled transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SweepReport {
    pub executed: usize,
    pub discarded: usize,
    pub rejected: usize,
}

/// Number of rows removed alongside a purged state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PurgeReport {
    pub rules: usize,
    pub history: u64,
}

impl Platform {
    pub fn new(
        wf_platform: Arc<dyn WFPlatform>,
        content: Arc<dyn ContentBackend>,
        resolver: Arc<dyn RoleResolver>,
    ) -> Self {
        Self {
            wf_platform,
            content,
            resolver,
            hooks: Arc::new(HookRegistry::default()),
        }
    }

    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Stores a new workflow and bootstraps its creation state, unless
    /// this is part of a bulk import.
    pub async fn create_workflow<'p>(
        &'p self,
        id: &str,
        label: &str,
        settings: WorkflowSettings,
        bulk_import: bool,
    ) -> Result<WorkflowCtrl<'p>, PlatformError> {
        if self.wf_platform.get_workflow(id).await?.is_some() {
            Err(CtrlError::WorkflowExists(id.to_string()))?
        }
        let workflow = Workflow::new(id, label).settings(settings);
        self.wf_platform.add_workflow(&workflow).await?;
        log::info!("created workflow {id}");
        let ctrl = WorkflowCtrl::new(self, workflow);
        ctrl.create_creation_state(bulk_import).await?;
        Ok(ctrl)
    }

    pub async fn get_workflow<'p>(
        &'p self,
        id: &str,
    ) -> Result<WorkflowCtrl<'p>, PlatformError> {
        let workflow = self.load_workflow(id).await?;
        Ok(WorkflowCtrl::new(self, workflow))
    }

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, PlatformError> {
        Ok(self.wf_platform.list_workflows().await?)
    }

    /// The workflow carried by the field of the entity type.
    pub async fn get_workflow_for_field<'p>(
        &'p self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<WorkflowCtrl<'p>, PlatformError> {
        let workflow = self.bound_workflow(entity_type, field_name).await?;
        Ok(WorkflowCtrl::new(self, workflow))
    }

    pub(crate) async fn bound_workflow(
        &self,
        entity_type: &str,
        field_name: &str,
    ) -> Result<Workflow, PlatformError> {
        Ok(self.wf_platform.workflow_for_field(entity_type, field_name).await?
            .ok_or_else(|| CtrlError::UnboundField {
                entity_type: entity_type.to_string(),
                field_name: field_name.to_string(),
            })?)
    }

    pub(crate) async fn load_workflow(
        &self,
        id: &str,
    ) -> Result<Workflow, PlatformError> {
        Ok(self.wf_platform.get_workflow(id).await?
            .ok_or_else(|| CtrlError::UnknownWorkflow(id.to_string()))?)
    }

    pub async fn bind_field(
        &self,
        entity_type: &str,
        field_name: &str,
        workflow_id: &str,
    ) -> Result<WorkflowField, PlatformError> {
        if self.wf_platform.get_workflow(workflow_id).await?.is_none() {
            Err(CtrlError::UnknownWorkflow(workflow_id.to_string()))?
        }
        let field = WorkflowField::new(entity_type, field_name, workflow_id);
        self.wf_platform.bind_field(&field).await?;
        log::info!("bound field {field_name} of {entity_type} to workflow {workflow_id}");
        Ok(field)
    }

    pub async fn list_fields(
        &self,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowField>, PlatformError> {
        Ok(self.wf_platform.list_fields(workflow_id).await?)
    }
}

mod history;
mod options;
mod schedule;
mod transition;
