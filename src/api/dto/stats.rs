//! DTOs for service-wide statistics.

use serde::{Deserialize, Serialize};

use crate::domain::entities::StoreStats;

/// Totals over the whole store.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Links ever created, deleted ones included.
    pub urls: u64,
    /// Owners with at least one link.
    pub users: u64,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            urls: stats.links,
            users: stats.owners,
        }
    }
}
