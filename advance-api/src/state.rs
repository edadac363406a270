use std::sync::Arc;

use advance_catalog::ProviderCatalog;
use advance_core::repository::{AdRepository, OfferRepository, OrganizationRepository, ProviderRepository};
use advance_core::{Clock, SystemClock};
use advance_offer::{EligibilityPolicy, FinancingDecisionEngine, OfferLifecycle};
use advance_store::app_config::{BusinessRules, CatalogConfig, Config, StorageBackend};
use advance_store::{DbClient, InMemoryStore, PostgresStore};
use anyhow::Context;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<OfferLifecycle>,
    pub catalog: Arc<ProviderCatalog>,
}

impl AppState {
    /// Connect the configured storage backend, seed reference data and
    /// wire the offer services on top of it.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                let store = Arc::new(InMemoryStore::new());
                for provider in &config.seed.providers {
                    store.add_provider(provider.clone()).await;
                }
                for organization in &config.seed.organizations {
                    store.add_organization(organization.clone()).await;
                }
                for ad in &config.seed.ads {
                    store.add_ad(ad.clone()).await;
                }
                Self::with_store(store, &config.catalog, &config.business_rules, clock).await
            }
            StorageBackend::Postgres => {
                let database = config
                    .database
                    .as_ref()
                    .context("storage.backend = \"postgres\" requires a [database] section")?;
                let db = DbClient::new(&database.url, database.max_connections)
                    .await
                    .context("Failed to connect to Postgres")?;
                db.migrate().await.context("Failed to run migrations")?;

                let store = Arc::new(PostgresStore::new(db.pool.clone()));
                for provider in &config.seed.providers {
                    store
                        .upsert_provider(provider)
                        .await
                        .with_context(|| format!("Failed to seed provider {}", provider.slug))?;
                }
                for organization in &config.seed.organizations {
                    store
                        .upsert_organization(organization)
                        .await
                        .with_context(|| format!("Failed to seed organization {}", organization.id))?;
                }
                for ad in &config.seed.ads {
                    store
                        .upsert_ad(ad)
                        .await
                        .with_context(|| format!("Failed to seed ad {}", ad.id))?;
                }
                Self::with_store(store, &config.catalog, &config.business_rules, clock).await
            }
        }
    }

    pub async fn with_store<S>(
        store: Arc<S>,
        catalog_config: &CatalogConfig,
        rules: &BusinessRules,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self>
    where
        S: OrganizationRepository + AdRepository + ProviderRepository + OfferRepository + 'static,
    {
        let catalog = Arc::new(
            ProviderCatalog::load(store.clone(), catalog_config.require_all_tiers)
                .await
                .context("Failed to load provider catalog")?,
        );

        let engine = Arc::new(FinancingDecisionEngine::new(
            catalog.clone(),
            store.clone(),
            clock.clone(),
            EligibilityPolicy::from(rules),
        ));

        let lifecycle = OfferLifecycle::new(store, catalog.clone(), engine).with_clock(clock);

        Ok(Self {
            lifecycle: Arc::new(lifecycle),
            catalog,
        })
    }
}
