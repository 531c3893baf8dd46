//! Batch entities for bulk creation and bulk soft deletion.

use super::link::{Owner, ShortCode};

/// One origin submitted in a batch save, tagged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub origin: String,
}

impl BatchItem {
    pub fn new(correlation_id: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            origin: origin.into(),
        }
    }
}

/// A batch item that was stored, with the code minted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub correlation_id: String,
    pub code: ShortCode,
}

/// Unit of work for the asynchronous soft-delete pipeline.
///
/// Only codes owned by `owner` are affected when the request is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDeleteRequest {
    pub owner: Owner,
    pub codes: Vec<ShortCode>,
}

impl BatchDeleteRequest {
    pub fn new(owner: Owner, codes: Vec<ShortCode>) -> Self {
        Self { owner, codes }
    }
}
