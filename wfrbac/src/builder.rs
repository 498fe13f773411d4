use wfcore::ac::traits::RoleResolver;
use crate::{
    error::Error,
    simple::SimpleResolver,
};
#[cfg(feature = "casbin")]
use crate::casbin::CasbinResolver;

#[derive(Clone, Debug, Default)]
pub(crate) enum Kind {
    #[default]
    Simple,
    #[cfg(feature = "casbin")]
    Casbin,
}

/// Builds a role resolver for the workflow engine.
///
/// Grants are provided as text, one per line, in the form of:
///
/// - `u:<uid>, <role>` grants the role to the user
/// - `<role>, <capability>` grants the capability to the role
///
/// Anything after a `#` is a comment.  The resolver is constructed by
/// calling [`build`](Builder::build).
#[derive(Clone, Debug, Default)]
pub struct Builder {
    pub(crate) grants: Vec<(String, String)>,
    pub(crate) kind: Kind,
}

impl Builder {
    pub fn new() -> Self {
        Default::default()
    }

    #[cfg(feature = "casbin")]
    pub fn new_casbin() -> Self {
        Self {
            kind: Kind::Casbin,
            .. Default::default()
        }
    }

    pub fn grant(mut self, subject: impl Into<String>, object: impl Into<String>) -> Self {
        self.grants.push((subject.into(), object.into()));
        self
    }

    pub fn grants(mut self, text: &str) -> Result<Self, Error> {
        for line in text.lines() {
            let line = line.split('#')
                .next()
                .unwrap_or_default()
                .trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(',') {
                Some((subject, object)) if !subject.trim().is_empty()
                    && !object.trim().is_empty() =>
                {
                    self.grants.push((
                        subject.trim().to_string(),
                        object.trim().to_string(),
                    ));
                }
                _ => return Err(Error::MalformedGrant(line.to_string())),
            }
        }
        Ok(self)
    }

    pub async fn build(&self) -> Result<Box<dyn RoleResolver>, Error> {
        log::trace!("building a {}Resolver with {} grants", self.kind, self.grants.len());
        Ok(match &self.kind {
            Kind::Simple => Box::new(self.build_simple()?),
            #[cfg(feature = "casbin")]
            Kind::Casbin => Box::new(CasbinResolver::new(&self.grants).await?),
        })
    }

    pub fn build_simple(&self) -> Result<SimpleResolver, Error> {
        let mut resolver = SimpleResolver::new();
        for (subject, object) in self.grants.iter() {
            match parse_user(subject)? {
                Some(uid) => resolver.grant_role(uid, object),
                None => resolver.grant_capability(subject, object),
            };
        }
        Ok(resolver)
    }
}

/// Parses the uid out of a `u:<uid>` subject.
pub(crate) fn parse_user(subject: &str) -> Result<Option<i64>, Error> {
    subject.strip_prefix("u:")
        .map(|uid| uid.parse::<i64>()
            .map_err(|_| Error::MalformedGrant(subject.to_string()))
        )
        .transpose()
}

mod display {
    use std::fmt::{Display, Formatter, Result};
    use super::Kind;

    impl Display for Kind {
        fn fmt(&self, f: &mut Formatter<'_>) -> Result {
            match self {
                Kind::Simple => f.write_str("Simple"),
                #[cfg(feature = "casbin")]
                Kind::Casbin => f.write_str("Casbin"),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use wfcore::ac::{
        Agent,
        Roles,
    };
    use super::*;

    const GRANTS: &str = "\
# editors and managers
u:1, editor
u:2, manager     # site manager
manager, bypass editorial workflow_transition access
";

    #[tokio::test]
    async fn from_text() -> anyhow::Result<()> {
        let resolver = Builder::new()
            .grants(GRANTS)?
            .grant("u:3", "reviewer")
            .build()
            .await?;
        assert_eq!(resolver.roles(&Agent::User(1)), Roles::from(["authenticated", "editor"]));
        assert_eq!(resolver.roles(&Agent::User(3)), Roles::from(["authenticated", "reviewer"]));
        let bypass = "bypass editorial workflow_transition access";
        assert!(resolver.has_capability(&Agent::User(2), bypass));
        assert!(!resolver.has_capability(&Agent::User(1), bypass));
        Ok(())
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Builder::new().grants("u:1"),
            Err(Error::MalformedGrant(_)),
        ));
        assert!(matches!(
            Builder::new().grant("u:x", "editor").build_simple(),
            Err(Error::MalformedGrant(_)),
        ));
    }
}
