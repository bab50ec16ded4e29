//! Audit logger: one record per gated request, log-and-continue on failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::audit::record::{AuditClock, NewAuditRecord, RecordId, Source};
use crate::audit::store::{AuditStore, StoreError};
use crate::reputation::Geolocation;

/// What the gate knows about a request when it is logged.
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub location: &'a Geolocation,
    pub method: &'a str,
    pub credential: Option<&'a str>,
    pub client_ip: String,
    pub url: &'a str,
    pub source: Source,
}

/// Why a record was not written.
#[derive(Debug, thiserror::Error)]
pub enum AuditWriteError {
    #[error("audit write timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
    clock: AuditClock,
    write_timeout: Duration,
    failed_writes: Arc<AtomicU64>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>, clock: AuditClock, write_timeout: Duration) -> Self {
        Self {
            store,
            clock,
            write_timeout,
            failed_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Number of records that could not be written since startup.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    /// Persist one record, stamped now. Failures are logged and counted,
    /// and returned so callers can tell them apart from successful inserts.
    pub async fn record(&self, entry: AuditEntry<'_>) -> Result<RecordId, AuditWriteError> {
        let record = NewAuditRecord::new(
            entry.location,
            NewAuditRecord::annotate_method(entry.method, entry.credential),
            entry.client_ip,
            entry.url.to_string(),
            self.clock.now(),
            entry.source,
        );

        let result = match timeout(self.write_timeout, self.store.insert(&record)).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => Err(AuditWriteError::Store(e)),
            Err(_) => Err(AuditWriteError::Timeout(self.write_timeout)),
        };

        match &result {
            Ok(id) => {
                crate::observability::metrics::record_audit_write("ok");
                tracing::debug!(record_id = %id, url = %record.url, "Audit record written");
            }
            Err(e) => {
                self.failed_writes.fetch_add(1, Ordering::Relaxed);
                let outcome = match e {
                    AuditWriteError::Timeout(_) => "timeout",
                    AuditWriteError::Store(_) => "error",
                };
                crate::observability::metrics::record_audit_write(outcome);
                tracing::error!(
                    error = %e,
                    url = %record.url,
                    client_ip = %record.client_ip,
                    "Audit write failed"
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::record::AuditRecord;
    use crate::audit::store::MemoryAuditStore;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn insert(&self, _: &NewAuditRecord) -> Result<RecordId, StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
        async fn list(&self) -> Result<Vec<AuditRecord>, StoreError> {
            Ok(Vec::new())
        }
        async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl AuditStore for StalledStore {
        async fn insert(&self, _: &NewAuditRecord) -> Result<RecordId, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(RecordId(1))
        }
        async fn list(&self) -> Result<Vec<AuditRecord>, StoreError> {
            Ok(Vec::new())
        }
        async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    fn entry<'a>(location: &'a Geolocation, credential: Option<&'a str>) -> AuditEntry<'a> {
        AuditEntry {
            location,
            method: "GET",
            credential,
            client_ip: "1.2.3.4".into(),
            url: "/api/ipcheck/logo.svg?v=2",
            source: Source::Tool,
        }
    }

    fn clock() -> AuditClock {
        AuditClock::new(540).unwrap()
    }

    #[tokio::test]
    async fn test_record_writes_all_fields() {
        let store = Arc::new(MemoryAuditStore::new());
        let logger = AuditLogger::new(store.clone(), clock(), Duration::from_secs(1));
        let location = Geolocation {
            country: "Japan".into(),
            region: "Tokyo".into(),
            city: "Chiyoda".into(),
        };

        let id = logger.record(entry(&location, Some("s3cret"))).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, id);
        assert_eq!(r.country, "Japan");
        assert_eq!(r.method, "GET s3cret");
        assert_eq!(r.url, "/api/ipcheck/logo.svg?v=2");
        assert_eq!(r.source, "tool");
        assert!(r.parsed_timestamp().is_some());
        assert_eq!(logger.failed_writes(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_counted() {
        let logger = AuditLogger::new(Arc::new(FailingStore), clock(), Duration::from_secs(1));
        let location = Geolocation::unknown();

        let err = logger.record(entry(&location, None)).await.unwrap_err();
        assert!(matches!(err, AuditWriteError::Store(StoreError::Unavailable(_))));
        assert_eq!(logger.failed_writes(), 1);
    }

    #[tokio::test]
    async fn test_stalled_store_times_out() {
        let logger = AuditLogger::new(Arc::new(StalledStore), clock(), Duration::from_millis(20));
        let location = Geolocation::unknown();

        let err = logger.record(entry(&location, None)).await.unwrap_err();
        assert!(matches!(err, AuditWriteError::Timeout(_)));
        assert_eq!(logger.failed_writes(), 1);
    }
}
