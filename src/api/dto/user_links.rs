//! DTOs for the per-owner link listing.

use serde::{Deserialize, Serialize};

/// A live link owned by the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserLink {
    pub short_url: String,
    pub original_url: String,
}
