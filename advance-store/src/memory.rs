use std::collections::HashMap;
use std::sync::Arc;

use advance_core::repository::{AdRepository, OfferRepository, OrganizationRepository, ProviderRepository};
use advance_core::{Ad, FinancingProvider, Offer, Organization, ProviderId, StoreError, StoreResult};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    organizations: HashMap<String, Organization>,
    ads: HashMap<String, Ad>,
    providers: HashMap<ProviderId, FinancingProvider>,
    /// Insertion order doubles as listing order
    offers: Vec<Offer>,
}

/// A thread-safe in-memory store implementing every repository trait.
///
/// Backs the `memory` storage backend and the test suites.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_organization(&self, organization: Organization) {
        let mut tables = self.tables.write().await;
        tables.organizations.insert(organization.id.clone(), organization);
    }

    pub async fn add_ad(&self, ad: Ad) {
        let mut tables = self.tables.write().await;
        tables.ads.insert(ad.id.clone(), ad);
    }

    /// Insert or replace a provider, keyed by id
    pub async fn add_provider(&self, provider: FinancingProvider) {
        let mut tables = self.tables.write().await;
        tables.providers.insert(provider.id, provider);
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>> {
        let tables = self.tables.read().await;
        Ok(tables.organizations.get(id).cloned())
    }
}

#[async_trait]
impl AdRepository for InMemoryStore {
    async fn get_ad(&self, id: &str) -> StoreResult<Option<Ad>> {
        let tables = self.tables.read().await;
        Ok(tables.ads.get(id).cloned())
    }

    async fn sum_ads_value(&self, org_id: &str) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        tables
            .ads
            .values()
            .filter(|ad| ad.org_id == org_id)
            .try_fold(0i64, |total, ad| ad.value().and_then(|v| total.checked_add(v)))
            .ok_or_else(|| StoreError::Corrupt {
                entity: "ads",
                reason: format!("total ads value of organization {} overflows", org_id),
            })
    }
}

#[async_trait]
impl ProviderRepository for InMemoryStore {
    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<FinancingProvider>> {
        let tables = self.tables.read().await;
        Ok(tables.providers.get(&id).cloned())
    }

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<FinancingProvider>> {
        let tables = self.tables.read().await;
        Ok(tables.providers.values().find(|p| p.slug == slug).cloned())
    }

    async fn list_providers(&self) -> StoreResult<Vec<FinancingProvider>> {
        let tables = self.tables.read().await;
        let mut providers: Vec<_> = tables.providers.values().cloned().collect();
        providers.sort_by_key(|p| p.id);
        Ok(providers)
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn insert_offer(&self, offer: &Offer) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.offers.iter().any(|o| o.id == offer.id) {
            return Err(StoreError::Conflict {
                entity: "offer",
                id: offer.id.clone(),
                expected: offer.revision,
            });
        }
        tables.offers.push(offer.clone());
        Ok(())
    }

    async fn update_offer(&self, offer: &Offer) -> StoreResult<Offer> {
        let mut tables = self.tables.write().await;
        let conflict = || StoreError::Conflict {
            entity: "offer",
            id: offer.id.clone(),
            expected: offer.revision,
        };

        let stored = tables
            .offers
            .iter_mut()
            .find(|o| o.id == offer.id)
            .ok_or_else(conflict)?;
        if stored.revision != offer.revision {
            return Err(conflict());
        }

        let mut updated = offer.clone();
        updated.revision += 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn get_offer(&self, id: &str) -> StoreResult<Option<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables.offers.iter().find(|o| o.id == id).cloned())
    }

    async fn list_offers_by_organization(&self, org_id: &str) -> StoreResult<Vec<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .offers
            .iter()
            .filter(|offer| {
                tables
                    .ads
                    .get(&offer.ad_id)
                    .is_some_and(|ad| ad.org_id == org_id)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ad(id: &str, org_id: &str, quantity: i64, price: i64) -> Ad {
        Ad {
            id: id.to_string(),
            quantity,
            price,
            org_id: org_id.to_string(),
        }
    }

    fn offer(id: &str, ad_id: &str) -> Offer {
        Offer::new(
            id.to_string(),
            ad_id.to_string(),
            "100_in_unload".to_string(),
            None,
            10,
            100,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_sum_ads_value_per_organization() {
        let store = InMemoryStore::new();
        store.add_ad(ad("ad-1", "org-1", 10, 1_000)).await;
        store.add_ad(ad("ad-2", "org-1", 1, 5_000)).await;
        store.add_ad(ad("ad-3", "org-2", 1, 99)).await;

        assert_eq!(store.sum_ads_value("org-1").await.unwrap(), 15_000);
        assert_eq!(store.sum_ads_value("org-2").await.unwrap(), 99);
        assert_eq!(store.sum_ads_value("org-3").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sum_ads_value_overflow_is_an_error() {
        let store = InMemoryStore::new();
        store.add_ad(ad("ad-1", "org-1", i64::MAX / 2, 3)).await;
        store.add_ad(ad("ad-2", "org-2", i64::MAX, 1)).await;
        store.add_ad(ad("ad-3", "org-2", 1, 1)).await;

        assert!(matches!(
            store.sum_ads_value("org-1").await,
            Err(StoreError::Corrupt { entity: "ads", .. })
        ));
        assert!(matches!(
            store.sum_ads_value("org-2").await,
            Err(StoreError::Corrupt { entity: "ads", .. })
        ));
    }

    #[tokio::test]
    async fn test_offers_listed_through_their_ad() {
        let store = InMemoryStore::new();
        store.add_ad(ad("ad-1", "org-1", 1, 1)).await;
        store.add_ad(ad("ad-2", "org-2", 1, 1)).await;
        store.insert_offer(&offer("offer-1", "ad-1")).await.unwrap();
        store.insert_offer(&offer("offer-2", "ad-2")).await.unwrap();
        store.insert_offer(&offer("offer-3", "ad-1")).await.unwrap();

        let ids: Vec<_> = store
            .list_offers_by_organization("org-1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();

        assert_eq!(ids, vec!["offer-1", "offer-3"]);
    }

    #[tokio::test]
    async fn test_update_bumps_revision_and_rejects_stale_writes() {
        let store = InMemoryStore::new();
        let original = offer("offer-1", "ad-1");
        store.insert_offer(&original).await.unwrap();

        let mut first = original.clone();
        first.accept(Utc::now());
        let saved = store.update_offer(&first).await.unwrap();
        assert_eq!(saved.revision, 1);

        // Still carries revision 0
        let stale = store.update_offer(&original).await;
        assert!(matches!(stale, Err(StoreError::Conflict { expected: 0, .. })));

        let stored = store.get_offer("offer-1").await.unwrap().unwrap();
        assert_eq!(stored, saved);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        store.insert_offer(&offer("offer-1", "ad-1")).await.unwrap();

        assert!(store.insert_offer(&offer("offer-1", "ad-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_lookups() {
        let store = InMemoryStore::new();
        store
            .add_provider(FinancingProvider {
                id: ProviderId(2),
                slug: "financing_fintech".to_string(),
                payment_method: "card".to_string(),
                financing_percentage: 7,
            })
            .await;
        store
            .add_provider(FinancingProvider {
                id: ProviderId(1),
                slug: "financing_bank".to_string(),
                payment_method: "bank_transfer".to_string(),
                financing_percentage: 5,
            })
            .await;

        assert_eq!(
            store.get_provider_by_slug("financing_bank").await.unwrap().unwrap().id,
            ProviderId(1)
        );
        assert!(store.get_provider(ProviderId(3)).await.unwrap().is_none());

        let slugs: Vec<_> = store
            .list_providers()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["financing_bank", "financing_fintech"]);
    }
}
