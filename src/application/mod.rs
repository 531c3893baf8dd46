//! Application layer services implementing business logic.
//!
//! This layer sits between the HTTP handlers and the storage contract: it
//! validates input, applies deadlines and hands deletions to the pipeline.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and deletion
//! - [`services::identity_service::IdentityService`] - Signed owner cookies

pub mod services;
