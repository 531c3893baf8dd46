//! Domain layer containing business entities and logic.
//!
//! This module defines the link entities, the storage contract and the
//! soft-delete pipeline, independent of any concrete backend.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`delete_pipeline`] - Asynchronous fan-out/fan-in soft deletion
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Request-level rules live in services (see [`crate::application::services`])
//!
//! # Deletion Flow
//!
//! 1. HTTP handler parses the submitted codes
//! 2. A [`entities::BatchDeleteRequest`] is pushed to the [`delete_pipeline::DeleteQueue`]
//! 3. The dispatcher splits it over the worker lanes
//! 4. Each lane applies its share via [`repositories::LinkRepository::soft_delete`]

pub mod delete_pipeline;
pub mod entities;
pub mod repositories;
