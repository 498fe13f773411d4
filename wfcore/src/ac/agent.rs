use serde::{Deserialize, Serialize};

/// The actor behind a transition.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub enum Agent {
    #[default]
    Anonymous,
    User(i64),
}

mod impls;
