//! Core domain entities of the short-link store.
//!
//! # Entity Types
//!
//! - [`Owner`] - Opaque identity of the submitting caller
//! - [`ShortCode`] - Generated 16-character identifier
//! - [`LinkRecord`] - Stored mapping with its soft-delete flag
//! - [`BatchItem`] / [`BatchResult`] - Bulk creation input and output
//! - [`BatchDeleteRequest`] - Unit of work for the delete pipeline

pub mod batch;
pub mod link;

pub use batch::{BatchDeleteRequest, BatchItem, BatchResult};
pub use link::{LinkRecord, Owner, SHORT_CODE_LEN, SavedLink, ShortCode, StoreStats};
