use advance_core::repository::{AdRepository, OfferRepository, OrganizationRepository, ProviderRepository};
use advance_core::{Ad, FinancingProvider, Offer, Organization, ProviderId, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const OFFER_COLUMNS: &str =
    "id, ad_id, payment_method, financing_provider, amount, price, status, revision, created_at, updated_at";

/// Postgres-backed implementation of every repository trait
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_organization(&self, organization: &Organization) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, country, created_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET country = EXCLUDED.country,
                created_date = EXCLUDED.created_date
            "#,
        )
        .bind(&organization.id)
        .bind(&organization.country)
        .bind(organization.created_date)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    pub async fn upsert_ad(&self, ad: &Ad) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ads (id, quantity, price, org_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET quantity = EXCLUDED.quantity,
                price = EXCLUDED.price,
                org_id = EXCLUDED.org_id
            "#,
        )
        .bind(&ad.id)
        .bind(ad.quantity)
        .bind(ad.price)
        .bind(&ad.org_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    /// Insert a provider or refresh an existing row with the same id
    pub async fn upsert_provider(&self, provider: &FinancingProvider) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO financing_providers (id, slug, payment_method, financing_percentage)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET slug = EXCLUDED.slug,
                payment_method = EXCLUDED.payment_method,
                financing_percentage = EXCLUDED.financing_percentage
            "#,
        )
        .bind(provider.id.0)
        .bind(&provider.slug)
        .bind(&provider.payment_method)
        .bind(i32::from(provider.financing_percentage))
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    country: String,
    created_date: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AdRow {
    id: String,
    quantity: i64,
    price: i64,
    org_id: String,
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: i64,
    slug: String,
    payment_method: String,
    financing_percentage: i32,
}

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: String,
    ad_id: String,
    payment_method: String,
    financing_provider: Option<i64>,
    amount: i64,
    price: i64,
    status: String,
    revision: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for FinancingProvider {
    type Error = StoreError;

    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        let financing_percentage = u8::try_from(row.financing_percentage)
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or_else(|| StoreError::Corrupt {
                entity: "financing_providers",
                reason: format!(
                    "provider {} has percentage {} outside 0..=100",
                    row.slug, row.financing_percentage
                ),
            })?;

        Ok(FinancingProvider {
            id: ProviderId(row.id),
            slug: row.slug,
            payment_method: row.payment_method,
            financing_percentage,
        })
    }
}

impl TryFrom<OfferRow> for Offer {
    type Error = StoreError;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|reason| StoreError::Corrupt {
            entity: "offers",
            reason,
        })?;

        Ok(Offer {
            id: row.id,
            ad_id: row.ad_id,
            payment_method: row.payment_method,
            financing_provider: row.financing_provider.map(ProviderId),
            amount: row.amount,
            price: row.price,
            status,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl OrganizationRepository for PostgresStore {
    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            "SELECT id, country, created_date FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| Organization {
            id: row.id,
            country: row.country,
            created_date: row.created_date,
        }))
    }
}

#[async_trait]
impl AdRepository for PostgresStore {
    async fn get_ad(&self, id: &str) -> StoreResult<Option<Ad>> {
        let row = sqlx::query_as::<_, AdRow>(
            "SELECT id, quantity, price, org_id FROM ads WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| Ad {
            id: row.id,
            quantity: row.quantity,
            price: row.price,
            org_id: row.org_id,
        }))
    }

    async fn sum_ads_value(&self, org_id: &str) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity * price), 0)::BIGINT FROM ads WHERE org_id = $1",
        )
        .bind(org_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)
    }
}

#[async_trait]
impl ProviderRepository for PostgresStore {
    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<FinancingProvider>> {
        let row = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, slug, payment_method, financing_percentage FROM financing_providers WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(FinancingProvider::try_from).transpose()
    }

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<FinancingProvider>> {
        let row = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, slug, payment_method, financing_percentage FROM financing_providers WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(FinancingProvider::try_from).transpose()
    }

    async fn list_providers(&self) -> StoreResult<Vec<FinancingProvider>> {
        let rows = sqlx::query_as::<_, ProviderRow>(
            "SELECT id, slug, payment_method, financing_percentage FROM financing_providers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(FinancingProvider::try_from).collect()
    }
}

#[async_trait]
impl OfferRepository for PostgresStore {
    async fn insert_offer(&self, offer: &Offer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO offers (id, ad_id, payment_method, financing_provider, amount, price, status, revision, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.ad_id)
        .bind(&offer.payment_method)
        .bind(offer.financing_provider.map(|p| p.0))
        .bind(offer.amount)
        .bind(offer.price)
        .bind(offer.status.as_str())
        .bind(offer.revision)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn update_offer(&self, offer: &Offer) -> StoreResult<Offer> {
        // The revision predicate makes the read-modify-write in the caller atomic
        let query = format!(
            r#"
            UPDATE offers
            SET payment_method = $2,
                financing_provider = $3,
                amount = $4,
                price = $5,
                status = $6,
                updated_at = $7,
                revision = revision + 1
            WHERE id = $1 AND revision = $8
            RETURNING {}
            "#,
            OFFER_COLUMNS
        );

        let row = sqlx::query_as::<_, OfferRow>(&query)
            .bind(&offer.id)
            .bind(&offer.payment_method)
            .bind(offer.financing_provider.map(|p| p.0))
            .bind(offer.amount)
            .bind(offer.price)
            .bind(offer.status.as_str())
            .bind(offer.updated_at)
            .bind(offer.revision)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        match row {
            Some(row) => Offer::try_from(row),
            None => Err(StoreError::Conflict {
                entity: "offer",
                id: offer.id.clone(),
                expected: offer.revision,
            }),
        }
    }

    async fn get_offer(&self, id: &str) -> StoreResult<Option<Offer>> {
        let query = format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS);

        let row = sqlx::query_as::<_, OfferRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(Offer::try_from).transpose()
    }

    async fn list_offers_by_organization(&self, org_id: &str) -> StoreResult<Vec<Offer>> {
        let rows = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT offers.id, offers.ad_id, offers.payment_method, offers.financing_provider,
                   offers.amount, offers.price, offers.status, offers.revision,
                   offers.created_at, offers.updated_at
            FROM offers
            JOIN ads ON ads.id = offers.ad_id
            WHERE ads.org_id = $1
            ORDER BY offers.created_at, offers.id
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(Offer::try_from).collect()
    }
}
