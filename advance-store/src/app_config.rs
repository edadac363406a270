use advance_core::{Ad, FinancingProvider, Organization};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Refuse to start unless every routing tier has a provider
    #[serde(default = "default_true")]
    pub require_all_tiers: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { require_all_tiers: true }
    }
}

fn default_true() -> bool { true }

/// Eligibility thresholds for financing decisions
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Total ads value must be strictly greater than this (minor units)
    #[serde(default = "default_min_total_ads_value")]
    pub min_total_ads_value: i64,
    #[serde(default = "default_min_organization_age_months")]
    pub min_organization_age_months: u32,
    /// Countries routed to bank financing; everything else goes to fintech
    #[serde(default = "default_bank_countries")]
    pub bank_countries: Vec<String>,
}

fn default_min_total_ads_value() -> i64 { 10_000 }
fn default_min_organization_age_months() -> u32 { 12 }
fn default_bank_countries() -> Vec<String> {
    vec!["SPAIN".to_string(), "FRANCE".to_string()]
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            min_total_ads_value: default_min_total_ads_value(),
            min_organization_age_months: default_min_organization_age_months(),
            bank_countries: default_bank_countries(),
        }
    }
}

/// Reference data written to the store at startup
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub providers: Vec<FinancingProvider>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    /// Each ad's `org_id` must name a seeded or existing organization
    #[serde(default)]
    pub ads: Vec<Ad>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `ADVANCE_SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("ADVANCE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
