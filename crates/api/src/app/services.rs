use std::sync::Arc;

use anyhow::Context;

use toyshelf_auth::Hs256JwtIssuer;
use toyshelf_infra::{CatalogSeed, CatalogService, DocumentStore, InMemoryDocumentStore};

use crate::config::ApiConfig;

pub type SharedStore = Arc<dyn DocumentStore>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub catalog: CatalogService<SharedStore>,
    pub tokens: Hs256JwtIssuer,
}

impl AppServices {
    pub fn new(store: SharedStore, tokens: Hs256JwtIssuer) -> Self {
        Self {
            catalog: CatalogService::new(store),
            tokens,
        }
    }
}

/// In-memory store, seeded from `CATALOG_SEED_PATH` when configured.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store = Arc::new(InMemoryDocumentStore::new());

    if let Some(path) = &config.seed_path {
        let seed = CatalogSeed::load(path)?;
        seed.apply(&store)
            .await
            .with_context(|| format!("failed to seed catalog from {}", path.display()))?;
    } else {
        tracing::info!("CATALOG_SEED_PATH not set, starting with an empty catalog");
    }

    let tokens = Hs256JwtIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl());
    Ok(AppServices::new(store, tokens))
}
