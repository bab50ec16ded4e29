//! Storage seam for audit records.
//!
//! The gate and console only need three operations: insert, list, and
//! delete by id. Backends are swappable behind [`AuditStore`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::audit::record::{AuditRecord, NewAuditRecord, RecordId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Per-id outcome of a bulk delete.
///
/// Deletions are independent: a failure on one id never rolls back the others.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<(RecordId, StoreError)>,
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a record and return its newly assigned id.
    async fn insert(&self, record: &NewAuditRecord) -> Result<RecordId, StoreError>;

    /// Every record. Order is backend-defined; callers sort.
    async fn list(&self) -> Result<Vec<AuditRecord>, StoreError>;

    /// Delete one record; [`StoreError::NotFound`] if it does not exist.
    async fn delete(&self, id: RecordId) -> Result<(), StoreError>;

    /// Attempt every id, collecting per-id outcomes.
    async fn delete_by_ids(&self, ids: &[RecordId]) -> DeleteReport {
        let mut report = DeleteReport::default();
        for &id in ids {
            match self.delete(id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        report
    }
}

/// Process-local store. Used for tests and for running without a database.
#[derive(Default)]
pub struct MemoryAuditStore {
    records: Mutex<Vec<AuditRecord>>,
    next_id: AtomicI64,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn insert(&self, record: &NewAuditRecord) -> Result<RecordId, StoreError> {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        records.push(AuditRecord::from_new(id, record.clone()));
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(records.clone())
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
