//! Infrastructure layer for external integrations.
//!
//! This layer implements the repository trait defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Memory, snapshot-file and PostgreSQL repositories
//! - [`store`] - The backend selected once at startup

pub mod persistence;
pub mod store;

pub use store::Store;
