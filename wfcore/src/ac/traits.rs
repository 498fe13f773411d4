use super::{
    agent::Agent,
    role::Roles,
};

/// Resolves what an agent may do.
///
/// Implementations are expected to be cheap to query; the engine calls
/// into this for every authorization decision.
pub trait RoleResolver: Send + Sync {
    /// The roles held by the agent, excluding any implicit per-item role.
    fn roles(&self, agent: &Agent) -> Roles;
    /// Whether the agent holds the named capability.
    fn has_capability(&self, agent: &Agent, capability: &str) -> bool;
}

/// The capability that lets an agent bypass rule roles for a workflow.
pub fn bypass_capability(workflow_id: &str) -> String {
    format!("bypass {workflow_id} workflow_transition access")
}
