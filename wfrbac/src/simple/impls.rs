use wfcore::ac::{
    Agent,
    role::{
        ANONYMOUS_ROLE,
        AUTHENTICATED_ROLE,
    },
    traits::RoleResolver,
};
use super::*;

impl SimpleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_role(&mut self, uid: i64, role: impl Into<String>) -> bool {
        self.user_roles.entry(uid)
            .or_default()
            .insert(role)
    }

    pub fn revoke_role(&mut self, uid: i64, role: &str) -> bool {
        self.user_roles.get_mut(&uid)
            .map(|roles| roles.remove(role))
            .unwrap_or(false)
    }

    pub fn grant_capability(
        &mut self,
        role: impl Into<String>,
        capability: impl Into<String>,
    ) -> bool {
        self.role_capabilities.entry(role.into())
            .or_default()
            .insert(capability.into())
    }
}

impl RoleResolver for SimpleResolver {
    fn roles(&self, agent: &Agent) -> Roles {
        match agent {
            Agent::Anonymous => Roles::from([ANONYMOUS_ROLE]),
            Agent::User(uid) => self.user_roles.get(uid)
                .cloned()
                .unwrap_or_default()
                .with(AUTHENTICATED_ROLE),
        }
    }

    fn has_capability(&self, agent: &Agent, capability: &str) -> bool {
        self.roles(agent)
            .iter()
            .any(|role| self.role_capabilities.get(role)
                .map(|caps| caps.contains(capability))
                .unwrap_or(false)
            )
    }
}
