//! Link creation, resolution and deletion service.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::delete_pipeline::DeleteQueue;
use crate::domain::entities::{
    BatchDeleteRequest, BatchItem, BatchResult, Owner, SavedLink, ShortCode, StoreStats,
};
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;

/// Request-facing wrapper around a [`LinkRepository`].
///
/// Every storage call made through the service runs under a deadline; a call
/// that outlives it is dropped, which cancels the backend operation, and
/// reported as [`StoreError::Unavailable`].
pub struct LinkService<R: LinkRepository> {
    repository: Arc<R>,
    delete_queue: DeleteQueue,
    base_url: String,
    timeout: Duration,
}

impl<R: LinkRepository> LinkService<R> {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<R>,
        delete_queue: DeleteQueue,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            delete_queue,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Resolves a raw short code to its origin.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a malformed code,
    /// [`StoreError::NotFound`] for an unknown one and [`StoreError::Gone`]
    /// for a deleted one.
    pub async fn resolve(&self, raw_code: &str) -> Result<String, StoreError> {
        let code: ShortCode = raw_code.parse()?;
        self.with_deadline(self.repository.get(&code)).await
    }

    /// Shortens `origin` for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a blank origin.
    pub async fn shorten(&self, owner: &Owner, origin: &str) -> Result<SavedLink, StoreError> {
        let origin = origin.trim();
        if origin.is_empty() {
            return Err(StoreError::invalid_input("origin must not be empty"));
        }

        self.with_deadline(self.repository.save(owner, origin)).await
    }

    /// Shortens a batch of origins for `owner`.
    ///
    /// Items with a blank origin are left out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] when the batch is empty.
    pub async fn shorten_batch(
        &self,
        owner: &Owner,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StoreError> {
        if items.is_empty() {
            return Err(StoreError::invalid_input("batch must not be empty"));
        }

        let items: Vec<BatchItem> = items
            .into_iter()
            .filter_map(|item| {
                let origin = item.origin.trim();
                if origin.is_empty() {
                    return None;
                }
                Some(BatchItem::new(item.correlation_id.clone(), origin))
            })
            .collect();

        if items.is_empty() {
            return Ok(Vec::new());
        }

        self.with_deadline(self.repository.save_batch(owner, items))
            .await
    }

    /// Lists the owner's live links.
    pub async fn links_by_owner(
        &self,
        owner: &Owner,
    ) -> Result<BTreeMap<ShortCode, String>, StoreError> {
        self.with_deadline(self.repository.links_by_owner(owner))
            .await
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.with_deadline(self.repository.stats()).await
    }

    /// Queues the owner's codes for soft deletion and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] if the list is empty or any code
    /// is malformed; nothing is queued in that case.
    pub fn delete_links(&self, owner: &Owner, raw_codes: &[String]) -> Result<(), StoreError> {
        let codes = raw_codes
            .iter()
            .map(|raw| raw.parse::<ShortCode>())
            .collect::<Result<Vec<_>, _>>()?;

        self.delete_queue
            .enqueue(BatchDeleteRequest::new(owner.clone(), codes))
    }

    /// Builds the public URL for a code.
    pub fn short_url(&self, code: &ShortCode) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    async fn with_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| StoreError::unavailable("storage operation timed out"))?
    }
}
