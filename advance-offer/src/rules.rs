use std::sync::Arc;

use advance_catalog::{ProviderCatalog, ProviderTier};
use advance_core::repository::AdRepository;
use advance_core::{Clock, FinancingProvider, Organization, StoreError};
use advance_store::app_config::BusinessRules;
use chrono::{DateTime, Months, Utc};
use tracing::{info, warn};

use crate::payout::{FinancingPartner, Payout, SimulatedPartner};

/// Why an organization does not qualify for financing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IneligibleReason {
    InsufficientAdsValue { total: i64, required: i64 },
    OrganizationTooYoung { created: DateTime<Utc> },
}

/// Outcome of evaluating the rules against one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(ProviderTier),
    Ineligible(IneligibleReason),
}

/// Outcome of a provider decision. `Ineligible` is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Eligible(FinancingProvider),
    Ineligible(IneligibleReason),
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Financing provider not found: {0}")]
    ProviderNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    pub min_total_ads_value: i64,
    pub min_organization_age: Months,
    pub bank_countries: Vec<String>,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::from(&BusinessRules::default())
    }
}

impl From<&BusinessRules> for EligibilityPolicy {
    fn from(rules: &BusinessRules) -> Self {
        Self {
            min_total_ads_value: rules.min_total_ads_value,
            min_organization_age: Months::new(rules.min_organization_age_months),
            bank_countries: rules.bank_countries.clone(),
        }
    }
}

impl EligibilityPolicy {
    /// Both conditions must hold; the value check is reported first.
    pub fn evaluate(
        &self,
        organization: &Organization,
        total_ads_value: i64,
        now: DateTime<Utc>,
    ) -> Eligibility {
        if total_ads_value <= self.min_total_ads_value {
            return Eligibility::Ineligible(IneligibleReason::InsufficientAdsValue {
                total: total_ads_value,
                required: self.min_total_ads_value,
            });
        }

        let old_enough = now
            .checked_sub_months(self.min_organization_age)
            .is_some_and(|cutoff| organization.created_date < cutoff);
        if !old_enough {
            return Eligibility::Ineligible(IneligibleReason::OrganizationTooYoung {
                created: organization.created_date,
            });
        }

        Eligibility::Eligible(self.tier_for(&organization.country))
    }

    fn tier_for(&self, country: &str) -> ProviderTier {
        let bank_served = self
            .bank_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country.trim()));

        if bank_served {
            ProviderTier::Bank
        } else {
            ProviderTier::Fintech
        }
    }
}

/// Selects a financing provider for an organization and computes payouts
pub struct FinancingDecisionEngine {
    catalog: Arc<ProviderCatalog>,
    ads: Arc<dyn AdRepository>,
    clock: Arc<dyn Clock>,
    partner: Arc<dyn FinancingPartner>,
    policy: EligibilityPolicy,
}

impl FinancingDecisionEngine {
    pub fn new(
        catalog: Arc<ProviderCatalog>,
        ads: Arc<dyn AdRepository>,
        clock: Arc<dyn Clock>,
        policy: EligibilityPolicy,
    ) -> Self {
        Self {
            catalog,
            ads,
            clock,
            partner: Arc::new(SimulatedPartner),
            policy,
        }
    }

    pub fn with_partner(mut self, partner: Arc<dyn FinancingPartner>) -> Self {
        self.partner = partner;
        self
    }

    pub async fn decide_provider(&self, organization: &Organization) -> Result<Decision, DecisionError> {
        let total_ads_value = self.ads.sum_ads_value(&organization.id).await?;

        match self.policy.evaluate(organization, total_ads_value, self.clock.now()) {
            Eligibility::Eligible(tier) => {
                let provider = self
                    .catalog
                    .tier(tier)
                    .map_err(|_| DecisionError::ProviderNotFound(tier.slug().to_string()))?;
                info!(
                    "Organization {} ({}) routed to {}",
                    organization.id, organization.country, provider.slug
                );
                Ok(Decision::Eligible(provider.clone()))
            }
            Eligibility::Ineligible(reason) => {
                info!("Organization {} not eligible for financing: {:?}", organization.id, reason);
                Ok(Decision::Ineligible(reason))
            }
        }
    }

    /// Net amount the seller receives from `provider` for `gross`.
    ///
    /// The partner is notified afterwards; a failed notification is logged only.
    pub async fn compute_net_payout(&self, provider: &FinancingProvider, gross: i64) -> Payout {
        let payout = Payout::compute(gross, provider.financing_percentage);

        if let Err(e) = self.partner.request_advance(provider, &payout).await {
            warn!("Partner notification failed for {}: {}", provider.slug, e);
        }

        payout
    }
}
