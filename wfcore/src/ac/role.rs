use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role implicitly granted to the owner of the content item for the
/// duration of an authorization check.
pub const AUTHOR_ROLE: &str = "workflow_author";
/// Role every agent that isn't logged in holds.
pub const ANONYMOUS_ROLE: &str = "anonymous";
/// Role every logged in user holds.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// A set of role identifiers.
///
/// Roles are site-defined strings rather than a closed enumeration, so
/// the set is kept ordered for stable serialization.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Roles(BTreeSet<String>);

mod impls;
