//! Link repository implementations.
//!
//! # Repositories
//!
//! - [`MemoryLinkRepository`] - In-process index, optionally persisted through a [`SnapshotFile`]
//! - [`PgLinkRepository`] - PostgreSQL storage with runtime-checked SQLx queries

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod snapshot;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
pub use snapshot::SnapshotFile;
