use std::sync::Arc;

use advance_catalog::{CatalogError, ProviderCatalog};
use advance_core::repository::{AdRepository, OfferRepository, OrganizationRepository};
use advance_core::{Clock, FinancingProvider, IdGenerator, Offer, StoreError, SystemClock, UuidGenerator};
use tracing::{info, warn};

use crate::payout::Payout;
use crate::rules::{Decision, FinancingDecisionEngine};

/// Terms supplied by the seller when creating an offer
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub ad_id: String,
    pub amount: i64,
    pub price: i64,
    pub payment_method: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("Ad not found: {0}")]
    AdNotFound(String),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    #[error("Financing partner not found: {0}")]
    PartnerNotFound(String),

    #[error("Offer {offer_id} is not set for financing partner {partner}")]
    PartnerMismatch { offer_id: String, partner: String },

    #[error("Offer already accepted: {0}")]
    AlreadyAccepted(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Catalog(CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the offer state machine: Pending -> Accepted.
pub struct OfferLifecycle {
    organizations: Arc<dyn OrganizationRepository>,
    ads: Arc<dyn AdRepository>,
    offers: Arc<dyn OfferRepository>,
    catalog: Arc<ProviderCatalog>,
    engine: Arc<FinancingDecisionEngine>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl OfferLifecycle {
    pub fn new<S>(store: Arc<S>, catalog: Arc<ProviderCatalog>, engine: Arc<FinancingDecisionEngine>) -> Self
    where
        S: OrganizationRepository + AdRepository + OfferRepository + 'static,
    {
        Self {
            organizations: store.clone(),
            ads: store.clone(),
            offers: store,
            catalog,
            engine,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a pending offer, routed to a provider when the ad's
    /// organization qualifies.
    ///
    /// An ineligible organization, or a failure while deciding, yields an
    /// offer without provider rather than an error.
    pub async fn create_offer(&self, request: NewOffer) -> Result<Offer, OfferError> {
        if request.amount < 0 || request.price < 0 {
            return Err(OfferError::InvalidRequest(
                "amount and price must not be negative".to_string(),
            ));
        }
        if request.payment_method.trim().is_empty() {
            return Err(OfferError::InvalidRequest("payment_method is required".to_string()));
        }

        let ad = self
            .ads
            .get_ad(&request.ad_id)
            .await?
            .ok_or_else(|| OfferError::AdNotFound(request.ad_id.clone()))?;

        let organization = self
            .organizations
            .get_organization(&ad.org_id)
            .await?
            .ok_or_else(|| OfferError::OrganizationNotFound(ad.org_id.clone()))?;

        let provider = match self.engine.decide_provider(&organization).await {
            Ok(Decision::Eligible(provider)) => Some(provider.id),
            Ok(Decision::Ineligible(_)) => None,
            Err(e) => {
                warn!(
                    "Financing decision failed for organization {}, creating offer without provider: {}",
                    organization.id, e
                );
                None
            }
        };

        let offer = Offer::new(
            self.ids.new_id(),
            ad.id,
            request.payment_method,
            provider,
            request.amount,
            request.price,
            self.clock.now(),
        );
        self.offers.insert_offer(&offer).await?;

        info!("Created offer {} (provider: {:?})", offer.id, offer.financing_provider);
        Ok(offer)
    }

    pub async fn get_offer(&self, offer_id: &str) -> Result<Offer, OfferError> {
        self.offers
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| OfferError::OfferNotFound(offer_id.to_string()))
    }

    /// Pending offers whose ad belongs to the organization, in store order
    pub async fn list_pending_by_organization(&self, org_id: &str) -> Result<Vec<Offer>, OfferError> {
        let offers = self.offers.list_offers_by_organization(org_id).await?;
        Ok(offers.into_iter().filter(Offer::is_pending).collect())
    }

    /// Compute the seller's net payout from the partner the offer was routed to.
    /// The offer itself is left untouched.
    pub async fn request_financing(
        &self,
        offer_id: &str,
        partner_slug: &str,
        gross_total: i64,
    ) -> Result<Payout, OfferError> {
        if gross_total < 0 {
            return Err(OfferError::InvalidRequest("total must not be negative".to_string()));
        }

        let offer = self.get_offer(offer_id).await?;
        let partner = self.resolve_partner(partner_slug).await?;

        if !offer.is_routed_to(partner.id) {
            return Err(OfferError::PartnerMismatch {
                offer_id: offer.id,
                partner: partner.slug,
            });
        }

        Ok(self.engine.compute_net_payout(&partner, gross_total).await)
    }

    /// Accept a pending offer, optionally overriding its provider.
    ///
    /// The override skips eligibility rules entirely.
    pub async fn accept_offer(&self, offer_id: &str, partner_slug: Option<&str>) -> Result<Offer, OfferError> {
        let mut offer = self.get_offer(offer_id).await?;
        if !offer.is_pending() {
            return Err(OfferError::AlreadyAccepted(offer.id));
        }

        let now = self.clock.now();
        if let Some(slug) = partner_slug.filter(|s| !s.trim().is_empty()) {
            let partner = self.resolve_partner(slug).await?;
            if !offer.is_routed_to(partner.id) {
                info!(
                    "Offer {} provider overridden at acceptance: {:?} -> {}",
                    offer.id, offer.financing_provider, partner.id
                );
            }
            offer.assign_provider(partner.id, now);
        }

        offer.accept(now);
        let offer = self.offers.update_offer(&offer).await?;

        info!("Accepted offer {}", offer.id);
        Ok(offer)
    }

    async fn resolve_partner(&self, slug: &str) -> Result<FinancingProvider, OfferError> {
        self.catalog.find_by_slug(slug).await.map_err(|e| match e {
            CatalogError::NotFound(slug) => OfferError::PartnerNotFound(slug),
            CatalogError::Store(e) => OfferError::Store(e),
            other => OfferError::Catalog(other),
        })
    }
}
