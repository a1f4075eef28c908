use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{Identity, ProfileData};

use super::{ProfileStore, StoreError};

/// Process-local store for development and tests. Loses everything on
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, ProfileData>>>,
    session: Arc<RwLock<Option<Identity>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_profile(&self, identity: &Identity) -> Result<ProfileData, StoreError> {
        self.profiles
            .read()
            .await
            .get(&identity.user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn save_profile(
        &self,
        identity: &Identity,
        profile: &ProfileData,
    ) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(identity.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Identity>, StoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn set_current_session(&self, identity: Option<&Identity>) -> Result<(), StoreError> {
        *self.session.write().await = identity.cloned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_owned(),
            email: "user@example.com".to_owned(),
            display_name: "Jordan".to_owned(),
        }
    }

    #[tokio::test]
    async fn missing_profile_reports_not_found() {
        let store = InMemoryProfileStore::new();
        let result = store.load_profile(&identity()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryProfileStore::new();
        let identity = identity();
        let mut profile = ProfileData::for_identity(&identity);
        profile.ai_personalization.frequent_symptoms.push("Headache".to_owned());

        store
            .save_profile(&identity, &profile)
            .await
            .expect("save should succeed");
        let loaded = store
            .load_profile(&identity)
            .await
            .expect("load should succeed");
        assert_eq!(loaded.basic_info.full_name, "Jordan");
        assert_eq!(loaded.ai_personalization.frequent_symptoms, vec!["Headache"]);
    }

    #[tokio::test]
    async fn session_slot_sets_and_clears() {
        let store = InMemoryProfileStore::new();
        assert!(store
            .current_session()
            .await
            .expect("read should succeed")
            .is_none());

        let identity = identity();
        store
            .set_current_session(Some(&identity))
            .await
            .expect("set should succeed");
        let current = store
            .current_session()
            .await
            .expect("read should succeed")
            .expect("session should be present");
        assert_eq!(current.user_id, "user-1");

        store
            .set_current_session(None)
            .await
            .expect("clear should succeed");
        assert!(store
            .current_session()
            .await
            .expect("read should succeed")
            .is_none());
    }
}
