pub mod models;
pub mod repository;
pub mod identity;
pub mod clock;

pub use models::{Ad, FinancingProvider, Offer, OfferStatus, Organization, ProviderId};
pub use identity::{IdGenerator, UuidGenerator};
pub use clock::{Clock, FixedClock, SystemClock};

/// Faults raised by a storage backend.
///
/// These are never business outcomes: callers surface them unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Concurrent modification of {entity} {id} (expected revision {expected})")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: i64,
    },
    #[error("Corrupt record in {entity}: {reason}")]
    Corrupt {
        entity: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
