use std::{
    collections::BTreeSet,
    fmt,
    ops::Deref,
};
use super::Roles;

impl Roles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>) -> bool {
        self.0.insert(role.into())
    }

    pub fn remove(&mut self, role: &str) -> bool {
        self.0.remove(role)
    }

    pub fn with(mut self, role: impl Into<String>) -> Self {
        self.insert(role);
        self
    }

    /// Returns true if any role is shared between the two sets.
    pub fn intersects(&self, other: &Roles) -> bool {
        !self.0.is_disjoint(&other.0)
    }
}

impl Deref for Roles {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Roles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Roles {
    fn from(roles: [&str; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl From<BTreeSet<String>> for Roles {
    fn from(roles: BTreeSet<String>) -> Self {
        Self(roles)
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            f.write_str(first)?;
            for role in iter {
                write!(f, ", {role}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Roles;

    #[test]
    fn smoke() -> anyhow::Result<()> {
        let editors = Roles::from(["editor", "reviewer"]);
        let authors = Roles::from(["workflow_author"]);
        assert!(!editors.intersects(&authors));
        assert!(editors.intersects(&Roles::from(["reviewer", "manager"])));
        assert!(!Roles::new().intersects(&Roles::new()));

        assert_eq!(editors.to_string(), "editor, reviewer");
        assert_eq!(serde_json::to_string(&editors)?, r#"["editor","reviewer"]"#);
        assert_eq!(serde_json::from_str::<Roles>(r#"["reviewer","editor"]"#)?, editors);
        Ok(())
    }

    #[test]
    fn insert_remove() {
        let mut roles = Roles::new().with("editor");
        assert!(roles.insert("manager"));
        assert!(!roles.insert("editor"));
        assert!(roles.remove("editor"));
        assert_eq!(roles, Roles::from(["manager"]));
    }
}
