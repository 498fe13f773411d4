use std::fmt;
use super::*;

impl Content {
    /// A content item that has not been stored yet.
    pub fn new(entity_type: impl Into<String>, entity_id: i64, owner_id: Option<i64>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
            owner_id,
            new: true,
            .. Default::default()
        }
    }

    pub fn with_field(mut self, field_name: impl Into<String>, sid: impl Into<String>) -> Self {
        self.fields.insert(field_name.into(), sid.into());
        self
    }
}

impl ContentItem for Content {
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(&self.entity_type, self.entity_id)
    }

    fn field_value(&self, field_name: &str) -> Option<String> {
        self.fields.get(field_name)
            .filter(|sid| !sid.is_empty())
            .cloned()
    }

    fn set_field_value(&mut self, field_name: &str, sid: &str) {
        self.fields.insert(field_name.to_string(), sid.to_string());
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }

    fn is_new(&self) -> bool {
        self.new
    }

    fn changed_time(&self) -> i64 {
        self.changed
    }

    fn set_changed_time(&mut self, timestamp: i64) {
        self.changed = timestamp;
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)?;
        for (name, sid) in self.fields.iter() {
            write!(f, " {name}={sid}")?;
        }
        Ok(())
    }
}

impl WorkflowField {
    pub fn new(
        entity_type: impl Into<String>,
        field_name: impl Into<String>,
        workflow_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            field_name: field_name.into(),
            workflow_id: workflow_id.into(),
        }
    }
}
