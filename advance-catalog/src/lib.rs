pub mod tier;
pub mod catalog;

pub use tier::ProviderTier;
pub use catalog::{CatalogError, ProviderCatalog};
