use casbin::{
    CoreApi,
    DefaultModel,
    MemoryAdapter,
    MgmtApi,
    RbacApi,
};
use parking_lot::Mutex;
use wfcore::ac::{
    Agent,
    Roles,
    role::{
        ANONYMOUS_ROLE,
        AUTHENTICATED_ROLE,
    },
    traits::RoleResolver,
};

use crate::builder::parse_user;

/// The casbin model for workflow role resolution.
const DEFAULT_MODEL: &str = "\
[request_definition]
r = sub, act

[policy_definition]
p = sub, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && keyMatch(r.act, p.act)
";

/// Resolves roles and capabilities through a casbin enforcer.
///
/// Users are subjects in the form of `u:<uid>`, the anonymous agent is
/// `-`.  Role grants are `g` grouping policies while capabilities are
/// `p` policies attached to roles.
pub struct CasbinResolver {
    enforcer: Mutex<casbin::Enforcer>,
}

impl CasbinResolver {
    pub async fn new(grants: &[(String, String)]) -> Result<Self, casbin::Error> {
        let m = DefaultModel::from_str(DEFAULT_MODEL).await?;
        let a = MemoryAdapter::default();
        let mut enforcer = casbin::Enforcer::new(m, a).await?;
        enforcer.add_named_grouping_policy("g", vec![
            Self::to_subject(&Agent::Anonymous),
            ANONYMOUS_ROLE.to_string(),
        ]).await?;

        let mut roles = Vec::new();
        let mut capabilities = Vec::new();
        for (subject, object) in grants.iter() {
            match parse_user(subject) {
                Ok(Some(uid)) => roles.push(vec![
                    Self::to_subject(&Agent::User(uid)),
                    object.clone(),
                ]),
                Ok(None) => capabilities.push(vec![
                    subject.clone(),
                    object.clone(),
                ]),
                Err(_) => log::warn!("skipping malformed grant for {subject}"),
            }
        }
        let n = roles.len() + capabilities.len();
        if !roles.is_empty() {
            enforcer.add_named_grouping_policies("g", roles).await?;
        }
        if !capabilities.is_empty() {
            enforcer.add_named_policies("p", capabilities).await?;
        }
        log::debug!("new CasbinResolver set up with {n} grants");
        Ok(Self { enforcer: Mutex::new(enforcer) })
    }

    fn to_subject(agent: &Agent) -> String {
        agent.uid()
            .map(|uid| format!("u:{uid}"))
            .unwrap_or("-".to_string())
    }

    /// Grant the role to the user.
    pub async fn grant_role(&mut self, uid: i64, role: &str) -> Result<bool, casbin::Error> {
        self.enforcer.get_mut().add_named_grouping_policy("g", vec![
            Self::to_subject(&Agent::User(uid)),
            role.to_string(),
        ]).await
    }

    /// Grant the capability to the role.
    pub async fn grant_capability(
        &mut self,
        role: &str,
        capability: &str,
    ) -> Result<bool, casbin::Error> {
        self.enforcer.get_mut().add_named_policy("p", vec![
            role.to_string(),
            capability.to_string(),
        ]).await
    }
}

impl RoleResolver for CasbinResolver {
    fn roles(&self, agent: &Agent) -> Roles {
        let subject = Self::to_subject(agent);
        let roles: Roles = self.enforcer.lock()
            .get_implicit_roles_for_user(&subject, None)
            .into_iter()
            .collect();
        match agent {
            Agent::Anonymous => roles,
            Agent::User(_) => roles.with(AUTHENTICATED_ROLE),
        }
    }

    fn has_capability(&self, agent: &Agent, capability: &str) -> bool {
        let roles = self.roles(agent);
        let enforcer = self.enforcer.lock();
        roles.iter()
            .any(|role| enforcer.enforce((role.as_str(), capability))
                .unwrap_or_else(|e| {
                    log::error!("casbin enforce failed: {e}");
                    false
                })
            )
    }
}
