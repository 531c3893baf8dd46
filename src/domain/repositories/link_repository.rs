//! Repository trait for short link storage.

use std::collections::BTreeMap;

use crate::domain::entities::{BatchItem, BatchResult, Owner, SavedLink, ShortCode, StoreStats};
use crate::error::StoreError;
use async_trait::async_trait;

/// Storage contract shared by every backend.
///
/// All backends must give the same observable answers for the same sequence
/// of calls, except for the value of freshly minted codes.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-memory, optionally snapshotted to a file
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::store::Store`] - the backend selected at startup
/// - Test mocks available with `cfg(test)`
///
/// # Cancellation
///
/// Dropping a returned future abandons the operation; the PostgreSQL backend
/// aborts the in-flight statement or transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Resolves a short code to its origin.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the code was never issued and
    /// [`StoreError::Gone`] if it has been soft-deleted.
    async fn get(&self, code: &ShortCode) -> Result<String, StoreError>;

    /// Shortens `origin` for `owner`.
    ///
    /// Saving an origin the owner already has returns the existing code with
    /// [`SavedLink::created`] set to `false`; no second record is created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if no free code could be minted.
    async fn save(&self, owner: &Owner, origin: &str) -> Result<SavedLink, StoreError>;

    /// Shortens several origins at once, best-effort.
    ///
    /// Items whose origin the owner already has, or that fail individually,
    /// are left out of the result. The call itself fails only when the batch
    /// as a whole cannot be applied.
    async fn save_batch(
        &self,
        owner: &Owner,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StoreError>;

    /// Lists the owner's links that are not deleted, keyed by code.
    ///
    /// An owner without links yields an empty map.
    async fn links_by_owner(&self, owner: &Owner)
    -> Result<BTreeMap<ShortCode, String>, StoreError>;

    /// Counts distinct owners and total links.
    async fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Flips `is_deleted` on the given codes owned by `owner`.
    ///
    /// Codes that are unknown, owned by someone else or already deleted are
    /// ignored. Returns how many records changed.
    async fn soft_delete(&self, owner: &Owner, codes: &[ShortCode]) -> Result<u64, StoreError>;
}
