use mockall::mock;
use wfcore::ac::{
    Agent,
    Roles,
    traits::RoleResolver,
};

mock! {
    pub Resolver {}
    impl RoleResolver for Resolver {
        fn roles(&self, agent: &Agent) -> Roles;
        fn has_capability(&self, agent: &Agent, capability: &str) -> bool;
    }
}
