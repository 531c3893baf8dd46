//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{IdentityService, LinkService};
use crate::infrastructure::Store;

/// Handles shared by all requests.
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<Store>>,
    pub store: Arc<Store>,
    pub identity: Arc<IdentityService>,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService<Store>>,
        store: Arc<Store>,
        identity: Arc<IdentityService>,
    ) -> Self {
        Self {
            link_service,
            store,
            identity,
        }
    }
}
