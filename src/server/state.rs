use std::sync::Arc;

use crate::blob::BlobStore;
use crate::config::Settings;
use crate::repository::TemplateRepository;
use crate::storage::Stores;

/// Shared handler state.
///
/// Stores are injected at construction; handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<dyn TemplateRepository>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(settings: Settings, stores: Stores) -> Self {
        Self {
            settings: Arc::new(settings),
            templates: stores.templates,
            blobs: stores.blobs,
        }
    }
}
