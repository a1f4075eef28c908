mod in_memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Identity, ProfileData};

pub use in_memory::InMemoryProfileStore;
pub use postgres::PostgresProfileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no profile stored for this user")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Storage collaborator for the externally-owned profile document and the
/// persisted auth session.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the full profile document. `StoreError::NotFound` means the user
    /// has none yet; callers construct a default.
    async fn load_profile(&self, identity: &Identity) -> Result<ProfileData, StoreError>;

    /// Upserts the full profile document. Last write wins; the core never
    /// assumes a concurrent writer.
    async fn save_profile(
        &self,
        identity: &Identity,
        profile: &ProfileData,
    ) -> Result<(), StoreError>;

    async fn current_session(&self) -> Result<Option<Identity>, StoreError>;

    async fn set_current_session(&self, identity: Option<&Identity>) -> Result<(), StoreError>;
}
