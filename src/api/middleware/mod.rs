//! HTTP middleware for request processing.
//!
//! Provides owner identity and observability middleware.

pub mod identity;
pub mod tracing;
