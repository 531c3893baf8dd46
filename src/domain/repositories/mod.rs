//! Storage contract shared by every backend.
//!
//! [`LinkRepository`] is implemented by the memory, snapshot-file and
//! PostgreSQL stores in `crate::infrastructure`; unit tests use the
//! `mockall`-generated `MockLinkRepository`.

pub mod link_repository;

pub use link_repository::LinkRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
