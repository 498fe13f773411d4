use std::fmt;
use crate::{
    ac::Agent,
    history::HistoryRecord,
};
use super::*;

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, entity_id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

impl TransitionStatus {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl fmt::Display for TransitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Validated => f.write_str("validated"),
            Self::Scheduled => f.write_str("scheduled"),
            Self::Executed => f.write_str("executed"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Discarded => f.write_str("discarded"),
        }
    }
}

impl TransitionInstance {
    pub fn new(
        workflow_id: impl Into<String>,
        target: EntityRef,
        field_name: impl Into<String>,
        from_sid: impl Into<String>,
        to_sid: impl Into<String>,
        agent: Agent,
        timestamp: i64,
    ) -> Self {
        Self {
            id: 0,
            workflow_id: workflow_id.into(),
            from_sid: from_sid.into(),
            to_sid: to_sid.into(),
            target,
            field_name: field_name.into(),
            uid: agent.uid(),
            timestamp,
            comment: None,
            attached: BTreeMap::new(),
            scheduled: false,
            executed: false,
            forced: false,
            status: TransitionStatus::New,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn attach(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attached.insert(key.into(), value.into());
        self
    }

    /// Marks the instance as scheduled for the given timestamp.
    pub fn schedule_at(mut self, timestamp: i64) -> Self {
        self.scheduled = true;
        self.timestamp = timestamp;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.forced = force;
        self
    }

    pub fn agent(&self) -> Agent {
        self.uid.into()
    }

    pub fn has_state_change(&self) -> bool {
        self.from_sid != self.to_sid
    }

    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().map_or(false, |c| !c.is_empty())
    }

    /// True when there is nothing to record: no state change, no
    /// comment and no attached data.
    pub fn is_empty(&self) -> bool {
        !self.has_state_change()
            && !self.has_comment()
            && self.attached.is_empty()
    }

    /// Key identifying this instance within a request.
    pub fn marker_label(&self) -> String {
        format!("{}-{}", self.from_sid, self.to_sid)
    }

    pub fn reject(&mut self, error: TransitionError) {
        self.status = TransitionStatus::Rejected(error);
    }

    pub fn to_history_record(&self) -> HistoryRecord {
        HistoryRecord {
            hid: 0,
            workflow_id: self.workflow_id.clone(),
            entity_type: self.target.entity_type.clone(),
            entity_id: self.target.entity_id,
            field_name: self.field_name.clone(),
            from_sid: self.from_sid.clone(),
            to_sid: self.to_sid.clone(),
            uid: self.uid,
            timestamp: self.timestamp,
            comment: self.comment.clone(),
        }
    }
}

impl fmt::Display for TransitionInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} -> {} ({})",
            self.workflow_id,
            self.target,
            self.field_name,
            self.from_sid,
            self.to_sid,
            self.status,
        )
    }
}
