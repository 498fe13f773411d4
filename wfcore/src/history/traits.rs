use async_trait::async_trait;
use crate::{
    error::BackendError,
    transition::EntityRef,
};
use super::{
    HistoryQuery,
    HistoryRecord,
};

/// Append-only storage of executed transitions.
#[async_trait]
pub trait HistoryBackend {
    /// Stores the record and returns its newly assigned hid.
    async fn append_history(
        &self,
        record: &HistoryRecord,
    ) -> Result<i64, BackendError>;
    async fn get_history(
        &self,
        hid: i64,
    ) -> Result<Option<HistoryRecord>, BackendError>;
    /// Latest record by timestamp, ties broken by hid descending.
    async fn find_latest_history(
        &self,
        target: &EntityRef,
        field_name: &str,
    ) -> Result<Option<HistoryRecord>, BackendError>;
    async fn find_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<HistoryRecord>, BackendError>;
    /// Removes every record referencing the state at either end.
    async fn purge_history_by_sid(
        &self,
        sid: &str,
    ) -> Result<u64, BackendError>;
}
