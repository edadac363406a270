use std::collections::HashMap;
use std::sync::Arc;

use advance_core::repository::ProviderRepository;
use advance_core::{FinancingProvider, ProviderId, StoreError};
use tracing::{info, warn};

use crate::tier::ProviderTier;

/// Catalog-related errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Financing provider not found: {0}")]
    NotFound(String),

    #[error("Financing provider {slug} has an invalid percentage: {percentage}")]
    InvalidPercentage { slug: String, percentage: u8 },

    #[error("Catalog is missing provider tiers: {}", .0.join(", "))]
    MissingTiers(Vec<&'static str>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only view over financing providers.
///
/// Routing tiers are resolved once in [`ProviderCatalog::load`]; slug and id
/// lookups go to the store every time.
pub struct ProviderCatalog {
    repo: Arc<dyn ProviderRepository>,
    tiers: HashMap<ProviderTier, FinancingProvider>,
}

impl ProviderCatalog {
    /// Resolve every [`ProviderTier`] against the store.
    ///
    /// With `require_all_tiers` a missing tier aborts with
    /// [`CatalogError::MissingTiers`]; otherwise it is logged and the tier
    /// reports `NotFound` when a decision routes to it.
    pub async fn load(
        repo: Arc<dyn ProviderRepository>,
        require_all_tiers: bool,
    ) -> Result<Self, CatalogError> {
        let mut tiers = HashMap::new();
        let mut missing = Vec::new();

        for tier in ProviderTier::ALL {
            match repo.get_provider_by_slug(tier.slug()).await? {
                Some(provider) => {
                    let provider = validate(provider)?;
                    info!(
                        "Resolved tier {} to provider {} ({}%)",
                        tier, provider.id, provider.financing_percentage
                    );
                    tiers.insert(tier, provider);
                }
                None => missing.push(tier.slug()),
            }
        }

        if !missing.is_empty() {
            if require_all_tiers {
                return Err(CatalogError::MissingTiers(missing));
            }
            warn!("Provider tiers without a catalog entry: {}", missing.join(", "));
        }

        Ok(Self { repo, tiers })
    }

    /// The provider a routing tier resolved to at load time
    pub fn tier(&self, tier: ProviderTier) -> Result<&FinancingProvider, CatalogError> {
        self.tiers
            .get(&tier)
            .ok_or_else(|| CatalogError::NotFound(tier.slug().to_string()))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<FinancingProvider, CatalogError> {
        let provider = self
            .repo
            .get_provider_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))?;
        validate(provider)
    }

    pub async fn find_by_id(&self, id: ProviderId) -> Result<FinancingProvider, CatalogError> {
        let provider = self
            .repo
            .get_provider(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        validate(provider)
    }

    pub async fn list(&self) -> Result<Vec<FinancingProvider>, CatalogError> {
        Ok(self.repo.list_providers().await?)
    }
}

fn validate(provider: FinancingProvider) -> Result<FinancingProvider, CatalogError> {
    if provider.financing_percentage > 100 {
        return Err(CatalogError::InvalidPercentage {
            slug: provider.slug,
            percentage: provider.financing_percentage,
        });
    }
    Ok(provider)
}
