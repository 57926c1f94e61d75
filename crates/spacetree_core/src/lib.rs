//! Core domain logic for SpaceTree workspaces.
//! Page trees, page duplication and workspace export/import over SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod templates;
pub mod tree;

pub use config::SpaceTreeConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::page::{PageNode, PageType};
pub use repo::store::{SqliteWorkspaceStore, StoreError, StoreResult, WorkspaceStore};
pub use repo::write_batch::WriteBatch;
pub use service::duplicate::{duplicate_page, DuplicateError, DuplicatePageRequest};
pub use service::page_tree::{
    multi_resolve_page_tree, resolve_page_tree, ResolveError, ResolveOptions,
};
pub use templates::{
    export_workspace_pages, import_workspace_pages, ExportOptions, ExportWorkspacePagesResult,
    ImportWorkspacePagesRequest, ImportWorkspacePagesResult, SnapshotSource, TemplateError,
    TemplateResult, WorkspacePagesExport,
};
pub use tree::{
    find_parent_of_type, map_page_tree, map_target_page_tree, multi_map_target_page_tree,
    MapPageTreeOptions, PageTreeNode, TargetPageTree, TreeError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
