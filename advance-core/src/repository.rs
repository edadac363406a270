use async_trait::async_trait;
use crate::models::{Ad, FinancingProvider, Offer, Organization, ProviderId};
use crate::StoreResult;

/// Repository trait for organization lookups
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>>;
}

/// Repository trait for ad data access
#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn get_ad(&self, id: &str) -> StoreResult<Option<Ad>>;

    /// Sum of `quantity * price` over every ad owned by the organization.
    /// Zero when it owns none.
    async fn sum_ads_value(&self, org_id: &str) -> StoreResult<i64>;
}

/// Repository trait for financing provider reference data
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<FinancingProvider>>;

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<FinancingProvider>>;

    async fn list_providers(&self) -> StoreResult<Vec<FinancingProvider>>;
}

/// Repository trait for offer data access
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert_offer(&self, offer: &Offer) -> StoreResult<()>;

    /// Persist the full record if the stored revision still equals
    /// `offer.revision`. Returns the record with its bumped revision, or
    /// `StoreError::Conflict` when someone else wrote first.
    async fn update_offer(&self, offer: &Offer) -> StoreResult<Offer>;

    async fn get_offer(&self, id: &str) -> StoreResult<Option<Offer>>;

    /// Offers whose ad belongs to the organization, oldest first
    async fn list_offers_by_organization(&self, org_id: &str) -> StoreResult<Vec<Offer>>;
}
