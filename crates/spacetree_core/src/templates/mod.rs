//! Workspace export/import pipeline.
//!
//! # Responsibility
//! - Serialize whole page forests of a space into portable snapshots.
//! - Rebuild snapshots under a target space with one consistent
//!   old -> new id map spanning pages, blocks, bounties, proposals and votes.
//!
//! # Invariants
//! - Import visits each source page once and commits one `WriteBatch`.
//! - Every foreign key written by an import resolves through the run's id
//!   map, or is cleared.
//! - Grants never keep a `source_permission_id` from the source space.

use crate::repo::store::StoreError;
use crate::tree::TreeError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cloners;
pub mod context;
pub mod export;
pub mod import;
pub mod roles;
pub mod snapshot;

pub use export::{export_workspace_pages, ExportOptions, ExportWorkspacePagesResult};
pub use import::{
    import_workspace_pages, ImportWorkspacePagesRequest, ImportWorkspacePagesResult,
    SnapshotSource,
};
pub use roles::import_roles;
pub use snapshot::{ExportedBlocks, ExportedPage, ExportedRole, WorkspacePagesExport};

/// Result type used by export/import operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors from export/import operations.
#[derive(Debug)]
pub enum TemplateError {
    /// Space, page or named snapshot does not exist.
    NotFound(String),
    /// Malformed snapshot or missing required identifier.
    InvalidInput(String),
    /// Snapshot lacks its required top-level collection.
    DataNotFound(String),
    /// Tree resolution failure.
    Tree(TreeError),
    /// Store-level failure.
    Store(StoreError),
    /// Snapshot file access failure.
    Io(std::io::Error),
    /// Snapshot (de)serialization failure.
    Json(serde_json::Error),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::DataNotFound(message) => write!(f, "data not found: {message}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "snapshot io error: {err}"),
            Self::Json(err) => write!(f, "snapshot json error: {err}"),
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::InvalidInput(_) | Self::DataNotFound(_) => None,
            Self::Tree(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<TreeError> for TemplateError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

impl From<StoreError> for TemplateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
