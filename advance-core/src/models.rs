use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seller organization, the input of every eligibility decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub country: String,
    pub created_date: DateTime<Utc>,
}

/// A published ad. `quantity * price` is its value in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ad {
    pub id: String,
    pub quantity: i64,
    pub price: i64,
    pub org_id: String,
}

impl Ad {
    /// `None` when the product does not fit in an i64
    pub fn value(&self) -> Option<i64> {
        self.quantity.checked_mul(self.price)
    }
}

/// Identifier of a financing provider row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProviderId(pub i64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payout partner reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinancingProvider {
    pub id: ProviderId,
    pub slug: String,
    pub payment_method: String,
    /// Whole-number fee rate in `0..=100`
    pub financing_percentage: u8,
}

/// Offer lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Pending,
    Accepted,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "PENDING",
            OfferStatus::Accepted => "ACCEPTED",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OfferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OfferStatus::Pending),
            "ACCEPTED" => Ok(OfferStatus::Accepted),
            other => Err(format!("unknown offer status '{}'", other)),
        }
    }
}

/// A seller's request for an advance against an ad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub id: String,
    pub ad_id: String,
    pub payment_method: String,
    /// `None` when no provider was eligible at creation time
    pub financing_provider: Option<ProviderId>,
    pub amount: i64,
    pub price: i64,
    pub status: OfferStatus,
    /// Bumped by the store on every successful update
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Create a pending offer
    pub fn new(
        id: String,
        ad_id: String,
        payment_method: String,
        financing_provider: Option<ProviderId>,
        amount: i64,
        price: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            ad_id,
            payment_method,
            financing_provider,
            amount,
            price,
            status: OfferStatus::Pending,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }

    /// True only when a provider is assigned and it is `provider`
    pub fn is_routed_to(&self, provider: ProviderId) -> bool {
        self.financing_provider == Some(provider)
    }

    pub fn assign_provider(&mut self, provider: ProviderId, at: DateTime<Utc>) {
        self.financing_provider = Some(provider);
        self.updated_at = at;
    }

    pub fn accept(&mut self, at: DateTime<Utc>) {
        self.status = OfferStatus::Accepted;
        self.updated_at = at;
    }
}
