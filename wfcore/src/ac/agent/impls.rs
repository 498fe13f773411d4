use std::fmt;
use super::Agent;

impl Agent {
    pub fn uid(&self) -> Option<i64> {
        match self {
            Agent::Anonymous => None,
            Agent::User(id) => Some(*id),
        }
    }

    /// Whether this agent owns an item with the provided owner id.
    ///
    /// Anonymous agents never own anything, even items without an owner.
    pub fn is_owner_of(&self, owner_id: Option<i64>) -> bool {
        match (self, owner_id) {
            (Agent::User(id), Some(owner)) => *id == owner,
            _ => false,
        }
    }
}

impl From<Option<i64>> for Agent {
    fn from(uid: Option<i64>) -> Agent {
        uid.map(Agent::User).unwrap_or_default()
    }
}

impl From<&Agent> for Option<i64> {
    fn from(agent: &Agent) -> Self {
        agent.uid()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Agent::Anonymous => f.write_str("anonymous"),
            Agent::User(id) => write!(f, "user {id}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Agent;

    #[test]
    fn ownership() {
        assert!(Agent::User(2).is_owner_of(Some(2)));
        assert!(!Agent::User(2).is_owner_of(Some(3)));
        assert!(!Agent::User(2).is_owner_of(None));
        assert!(!Agent::Anonymous.is_owner_of(None));
    }

    #[test]
    fn conversion() {
        assert_eq!(Agent::from(Some(3)), Agent::User(3));
        assert_eq!(Agent::from(None), Agent::Anonymous);
        assert_eq!(Option::<i64>::from(&Agent::User(4)), Some(4));
        assert_eq!(Agent::User(4).to_string(), "user 4");
    }
}
