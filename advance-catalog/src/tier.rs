use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing tiers a financing decision can land on.
///
/// Each tier maps to exactly one provider slug in the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderTier {
    /// Traditional bank financing, offered to organizations in bank-served countries
    Bank,
    Fintech,
}

impl ProviderTier {
    pub const ALL: [ProviderTier; 2] = [ProviderTier::Bank, ProviderTier::Fintech];

    pub fn slug(&self) -> &'static str {
        match self {
            ProviderTier::Bank => "financing_bank",
            ProviderTier::Fintech => "financing_fintech",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.slug() == slug)
    }
}

impl fmt::Display for ProviderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
