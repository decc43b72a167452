/// Shared application state
use crate::services::{AuthService, BlobStorage};
use crate::streaming::StreamPolicy;
use cratedrop_core::TrackCatalog;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TrackCatalog>,
    pub storage: Arc<dyn BlobStorage>,
    pub auth_service: Arc<AuthService>,
    pub stream_policy: Arc<StreamPolicy>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn TrackCatalog>,
        storage: Arc<dyn BlobStorage>,
        auth_service: Arc<AuthService>,
        stream_policy: StreamPolicy,
    ) -> Self {
        Self {
            catalog,
            storage,
            auth_service,
            stream_policy: Arc::new(stream_policy),
        }
    }
}
