use advance_core::FinancingProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Split of a gross amount between the provider's fee and the seller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payout {
    pub gross: i64,
    pub fee: i64,
    pub net: i64,
}

impl Payout {
    /// `fee = gross * percentage / 100`, truncated toward zero.
    pub fn compute(gross: i64, percentage: u8) -> Self {
        // Widened so large gross amounts cannot overflow; |fee| <= |gross|
        let fee = (i128::from(gross) * i128::from(percentage) / 100) as i64;
        Self {
            gross,
            fee,
            net: gross - fee,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("Partner {partner} rejected the request: {reason}")]
    Rejected { partner: String, reason: String },
}

/// Notification sent to a financing partner once a payout is computed.
///
/// Failures are reported back but never change the payout.
#[async_trait]
pub trait FinancingPartner: Send + Sync {
    async fn request_advance(
        &self,
        provider: &FinancingProvider,
        payout: &Payout,
    ) -> Result<(), PartnerError>;
}

/// Stands in for the partner integration: logs the request and succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedPartner;

#[async_trait]
impl FinancingPartner for SimulatedPartner {
    async fn request_advance(
        &self,
        provider: &FinancingProvider,
        payout: &Payout,
    ) -> Result<(), PartnerError> {
        info!(
            partner = %provider.slug,
            gross = payout.gross,
            fee = payout.fee,
            net = payout.net,
            "Requesting financing from {}",
            provider.slug
        );
        Ok(())
    }
}
