//! Utility functions shared by the stores and the HTTP layer.
//!
//! - [`code_generator`] - Short code and random token generation
//! - [`db_error`] - PostgreSQL constraint violation helpers

pub mod code_generator;
pub mod db_error;
