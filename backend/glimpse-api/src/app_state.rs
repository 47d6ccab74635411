use std::sync::Arc;

use anyhow::Result;

use doc_store::{DocumentStore, MemoryStore, RestStore};

use crate::config::Config;
use crate::security::jwt;
use crate::services::media::{CloudinaryHost, MediaHost};

/// Shared application state, cloned per worker. Collaborators are injected
/// here once at startup; nothing below the handlers reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub media: Arc<dyn MediaHost>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn initialize(config: Config) -> Result<Self> {
        jwt::initialize(&config.auth.jwt_secret)?;

        let store: Arc<dyn DocumentStore> = match &config.store.url {
            Some(url) => {
                tracing::info!("using document store at {}", url);
                Arc::new(RestStore::new(url))
            }
            None => {
                tracing::warn!("STORE_URL not set, using in-memory document store");
                Arc::new(MemoryStore::new())
            }
        };

        let media: Arc<dyn MediaHost> = Arc::new(CloudinaryHost::new(
            &config.media.base_url,
            &config.media.cloud_name,
            &config.media.upload_preset,
        ));

        Ok(Self {
            store,
            media,
            config: Arc::new(config),
        })
    }
}
