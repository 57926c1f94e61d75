//! Persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the read/transactional-write contract consumed by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - All writes go through one `WriteBatch` commit per call.
//! - Repository APIs return semantic `InvalidData` errors in addition to DB
//!   transport errors.

pub mod store;
pub mod write_batch;

pub use store::{
    BlockListQuery, PageListQuery, SqliteWorkspaceStore, StoreError, StoreResult, WorkspaceStore,
};
pub use write_batch::WriteBatch;
