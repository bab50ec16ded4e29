//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! Access gate decision
//!     → logger.rs (stamp with fixed-zone clock, bounded insert)
//!     → store.rs (AuditStore: insert / list / delete)
//!         → sqlite.rs (table "requests")
//!         → MemoryAuditStore (tests, database-less runs)
//!
//! Audit console
//!     → store.rs list → record.rs sort_newest_first
//!     → store.rs delete_by_ids (independent, best-effort)
//! ```
//!
//! # Design Decisions
//! - Store failures never change the caller's response; they are logged and counted
//! - Records are immutable; the only mutation is delete by id
//! - Ordering is applied by the console, not trusted to the backend

pub mod logger;
pub mod record;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

pub use logger::{AuditEntry, AuditLogger, AuditWriteError};
pub use record::{sort_newest_first, AuditClock, AuditRecord, NewAuditRecord, RecordId, Source};
pub use sqlite::SqliteAuditStore;
pub use store::{AuditStore, DeleteReport, MemoryAuditStore, StoreError};

use crate::config::{AuditBackend, AuditConfig};

/// Build the store selected by `config`.
pub async fn open_store(config: &AuditConfig) -> Result<Arc<dyn AuditStore>, StoreError> {
    match config.backend {
        AuditBackend::Sqlite => {
            let store =
                SqliteAuditStore::connect(&config.database_url, config.max_connections).await?;
            Ok(Arc::new(store))
        }
        AuditBackend::Memory => {
            tracing::warn!("Using in-memory audit store; records are lost on restart");
            Ok(Arc::new(MemoryAuditStore::new()))
        }
    }
}
