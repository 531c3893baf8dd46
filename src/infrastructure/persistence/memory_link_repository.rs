//! In-memory link repository, optionally backed by a snapshot file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::snapshot::SnapshotFile;
use crate::domain::entities::{
    BatchItem, BatchResult, LinkRecord, Owner, SavedLink, ShortCode, StoreStats,
};
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;
use crate::utils::code_generator::{MAX_CODE_ATTEMPTS, generate_code};

/// Nested link index: every record lives in the catch-all map and in its
/// owner's map.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LinkIndex {
    all: HashMap<ShortCode, LinkRecord>,
    owners: HashMap<Owner, HashMap<ShortCode, LinkRecord>>,
}

impl LinkIndex {
    /// Linear scan of the owner's records.
    fn find_by_origin(&self, owner: &Owner, origin: &str) -> Option<ShortCode> {
        self.owners.get(owner).and_then(|links| {
            links
                .values()
                .find(|record| record.origin == origin)
                .map(|record| record.short_code.clone())
        })
    }

    fn mint_code(&self) -> Result<ShortCode, StoreError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code()?;
            if !self.all.contains_key(&code) {
                return Ok(code);
            }
            debug!(code = %code, "Short code collision, regenerating");
        }

        Err(StoreError::internal("failed to mint a unique short code"))
    }

    fn insert(&mut self, owner: &Owner, record: LinkRecord) {
        let code = record.short_code.clone();
        self.all.insert(code.clone(), record.clone());
        self.owners
            .entry(owner.clone())
            .or_default()
            .insert(code, record);
    }
}

/// State shared between a repository handle and its mutation tasks.
struct Shared {
    index: Mutex<LinkIndex>,
    snapshot: Option<SnapshotFile>,
}

impl Shared {
    /// Must be called with the index lock held.
    async fn persist(&self, index: &LinkIndex) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };

        if let Err(e) = snapshot.write(index).await {
            warn!(
                path = %snapshot.path().display(),
                error = %e,
                "Snapshot write failed; change kept in memory only"
            );
        }
    }

    async fn save(&self, owner: &Owner, origin: &str) -> Result<SavedLink, StoreError> {
        let mut index = self.index.lock().await;

        if let Some(existing) = index.find_by_origin(owner, origin) {
            debug!(owner = %owner, code = %existing, "Origin already shortened");
            return Ok(SavedLink::existing(existing));
        }

        let code = index.mint_code()?;
        index.insert(owner, LinkRecord::new(code.clone(), origin.to_string()));
        self.persist(&index).await;

        Ok(SavedLink::created(code))
    }

    async fn save_batch(
        &self,
        owner: &Owner,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StoreError> {
        let mut index = self.index.lock().await;
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            if index.find_by_origin(owner, &item.origin).is_some() {
                debug!(
                    owner = %owner,
                    correlation_id = %item.correlation_id,
                    "Batch item skipped: origin already shortened"
                );
                continue;
            }

            let code = match index.mint_code() {
                Ok(code) => code,
                Err(e) => {
                    warn!(correlation_id = %item.correlation_id, error = %e, "Batch item skipped");
                    continue;
                }
            };

            index.insert(owner, LinkRecord::new(code.clone(), item.origin));
            results.push(BatchResult {
                correlation_id: item.correlation_id,
                code,
            });
        }

        if !results.is_empty() {
            self.persist(&index).await;
        }

        Ok(results)
    }

    async fn soft_delete(&self, owner: &Owner, codes: &[ShortCode]) -> Result<u64, StoreError> {
        let mut guard = self.index.lock().await;
        let index = &mut *guard;

        let Some(owned) = index.owners.get_mut(owner) else {
            return Ok(0);
        };

        let mut changed = 0;
        for code in codes {
            let Some(record) = owned.get_mut(code) else {
                continue;
            };

            if record.mark_deleted() {
                changed += 1;
            }
            if let Some(global) = index.all.get_mut(code) {
                global.mark_deleted();
            }
        }

        if changed > 0 {
            self.persist(index).await;
        }

        Ok(changed)
    }
}

/// Link repository holding every record in process memory.
///
/// One mutex guards the whole index for reads and writes alike, including
/// the delete pipeline's soft deletes.
///
/// When built with [`MemoryLinkRepository::with_snapshot`], every mutation
/// rewrites the snapshot file before returning. A failed snapshot write is
/// logged and the in-memory change is kept.
///
/// Mutations run on their own task and keep the lock until the snapshot is
/// written, even if the caller stops waiting. A cancelled call may therefore
/// still take effect.
pub struct MemoryLinkRepository {
    shared: Arc<Shared>,
}

impl MemoryLinkRepository {
    /// Creates an empty, purely in-memory repository.
    pub fn new() -> Self {
        Self::from_parts(LinkIndex::default(), None)
    }

    /// Creates a repository persisted to `snapshot`, loading its current
    /// contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if an existing snapshot cannot be
    /// read or decoded.
    pub async fn with_snapshot(snapshot: SnapshotFile) -> Result<Self, StoreError> {
        let index: LinkIndex = snapshot.load().await?.unwrap_or_default();

        info!(
            path = %snapshot.path().display(),
            links = index.all.len(),
            owners = index.owners.len(),
            "Snapshot loaded"
        );

        Ok(Self::from_parts(index, Some(snapshot)))
    }

    fn from_parts(index: LinkIndex, snapshot: Option<SnapshotFile>) -> Self {
        Self {
            shared: Arc::new(Shared {
                index: Mutex::new(index),
                snapshot,
            }),
        }
    }

    /// Writes the current index to the snapshot file, if any.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let index = self.shared.index.lock().await;
        match &self.shared.snapshot {
            Some(snapshot) => snapshot.write(&*index).await,
            None => Ok(()),
        }
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a mutation to completion on its own task.
async fn detached<T, F>(mutation: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    tokio::spawn(mutation)
        .await
        .map_err(|e| StoreError::internal(format!("store task failed: {e}")))?
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn get(&self, code: &ShortCode) -> Result<String, StoreError> {
        let index = self.shared.index.lock().await;

        match index.all.get(code) {
            None => Err(StoreError::NotFound(code.to_string())),
            Some(record) if record.is_deleted => Err(StoreError::Gone(code.to_string())),
            Some(record) => Ok(record.origin.clone()),
        }
    }

    async fn save(&self, owner: &Owner, origin: &str) -> Result<SavedLink, StoreError> {
        let shared = self.shared.clone();
        let owner = owner.clone();
        let origin = origin.to_string();

        detached(async move { shared.save(&owner, &origin).await }).await
    }

    async fn save_batch(
        &self,
        owner: &Owner,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StoreError> {
        let shared = self.shared.clone();
        let owner = owner.clone();

        detached(async move { shared.save_batch(&owner, items).await }).await
    }

    async fn links_by_owner(
        &self,
        owner: &Owner,
    ) -> Result<BTreeMap<ShortCode, String>, StoreError> {
        let index = self.shared.index.lock().await;

        Ok(index
            .owners
            .get(owner)
            .map(|links| {
                links
                    .values()
                    .filter(|record| !record.is_deleted)
                    .map(|record| (record.short_code.clone(), record.origin.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let index = self.shared.index.lock().await;

        Ok(StoreStats {
            owners: index.owners.values().filter(|m| !m.is_empty()).count() as u64,
            links: index.all.len() as u64,
        })
    }

    async fn soft_delete(&self, owner: &Owner, codes: &[ShortCode]) -> Result<u64, StoreError> {
        let shared = self.shared.clone();
        let owner = owner.clone();
        let codes = codes.to_vec();

        detached(async move { shared.soft_delete(&owner, &codes).await }).await
    }
}
