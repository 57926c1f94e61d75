//! Use-case services over the workspace store.
//!
//! # Responsibility
//! - Orchestrate store reads, pure tree algorithms and batched writes.
//! - Map store failures into per-use-case error enums.
//!
//! # Invariants
//! - Services never mutate source records.
//! - Each mutating call commits at most one `WriteBatch`.

pub mod block_relink;
pub mod duplicate;
pub mod page_tree;

pub use duplicate::{duplicate_page, DuplicateError, DuplicatePageRequest};
pub use page_tree::{multi_resolve_page_tree, resolve_page_tree, ResolveError, ResolveOptions};
