use async_trait::async_trait;
use crate::error::BackendError;
use super::{
    TransitionRule,
    TransitionRules,
};

#[async_trait]
pub trait RuleBackend {
    async fn insert_rule(
        &self,
        rule: &TransitionRule,
    ) -> Result<(), BackendError>;
    async fn get_rule(
        &self,
        id: &str,
    ) -> Result<Option<TransitionRule>, BackendError>;
    /// Every stored rule of the workflow, unfiltered and unsorted.
    async fn list_rules(
        &self,
        workflow_id: &str,
    ) -> Result<TransitionRules, BackendError>;
    /// Updates the label and the role set.
    async fn update_rule(
        &self,
        rule: &TransitionRule,
    ) -> Result<bool, BackendError>;
    async fn delete_rule(
        &self,
        id: &str,
    ) -> Result<bool, BackendError>;
}
