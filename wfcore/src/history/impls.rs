use std::fmt;
use crate::transition::EntityRef;
use super::*;

impl HistoryRecord {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(&self.entity_type, self.entity_id)
    }

    pub fn has_state_change(&self) -> bool {
        self.from_sid != self.to_sid
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#{} {}:{} [{}] {} -> {} at {}",
            self.hid,
            self.entity_type,
            self.entity_id,
            self.field_name,
            self.from_sid,
            self.to_sid,
            self.timestamp,
        )?;
        if let Some(comment) = &self.comment {
            write!(f, ": {comment}")?;
        }
        Ok(())
    }
}

impl HistoryOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl HistoryQuery {
    pub fn new(entity_type: impl Into<String>, entity_ids: Vec<i64>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_ids,
            .. Default::default()
        }
    }

    pub fn field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    pub fn order(mut self, order: HistoryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}
