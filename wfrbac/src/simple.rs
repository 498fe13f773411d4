use std::collections::{
    BTreeSet,
    HashMap,
};
use wfcore::ac::Roles;

/// A resolver backed by plain maps.
///
/// Anonymous agents hold the `anonymous` role, users hold the
/// `authenticated` role along with whatever was granted to their uid.
/// Capabilities are granted to roles.
#[derive(Clone, Debug, Default)]
pub struct SimpleResolver {
    user_roles: HashMap<i64, Roles>,
    role_capabilities: HashMap<String, BTreeSet<String>>,
}

mod impls;
