pub mod rules;
pub mod payout;
pub mod lifecycle;

pub use rules::{Decision, DecisionError, EligibilityPolicy, FinancingDecisionEngine, IneligibleReason};
pub use payout::{FinancingPartner, PartnerError, Payout, SimulatedPartner};
pub use lifecycle::{NewOffer, OfferError, OfferLifecycle};
