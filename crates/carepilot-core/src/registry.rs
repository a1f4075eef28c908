use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::model::ModelProvider;
use crate::places::PlaceSearch;
use crate::profile::ProfileStore;
use crate::reminders::ReminderNotifier;
use crate::session::{ChatSession, SessionConfig};
use crate::types::Identity;

/// Owns the live sessions and the collaborators they share. Sessions are
/// keyed by an opaque id handed to the client when the session opens.
pub struct SessionRegistry {
    store: Arc<dyn ProfileStore>,
    model: Arc<dyn ModelProvider>,
    places: Arc<dyn PlaceSearch>,
    notifier: Arc<dyn ReminderNotifier>,
    config: SessionConfig,
    sessions: RwLock<HashMap<Uuid, Arc<ChatSession>>>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        model: Arc<dyn ModelProvider>,
        places: Arc<dyn PlaceSearch>,
        notifier: Arc<dyn ReminderNotifier>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            model,
            places,
            notifier,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a new session, as a guest or for a signed-in user.
    pub async fn open(&self, identity: Option<Identity>) -> (Uuid, Arc<ChatSession>) {
        let session = Arc::new(
            ChatSession::open(
                Arc::clone(&self.store),
                Arc::clone(&self.model),
                Arc::clone(&self.places),
                Arc::clone(&self.notifier),
                identity,
                self.config.clone(),
            )
            .await,
        );

        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::clone(&session));
        debug!(session_id = %id, "session registered");
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ChatSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Closes a session and forgets it. Returns false when the id is
    /// unknown, which also covers double logout.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.close().await;
                debug!(session_id = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// The login recorded by the most recent authenticated session, if any.
    /// Lets a restarting client resume without re-entering credentials.
    pub async fn remembered_login(&self) -> Option<Identity> {
        match self.store.current_session().await {
            Ok(identity) => identity,
            Err(error) => {
                debug!(?error, "stored login lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockModelProvider;
    use crate::places::SyntheticPlaceDirectory;
    use crate::profile::InMemoryProfileStore;
    use crate::reminders::LogNotifier;
    use crate::session::TypingDelay;
    use std::time::Duration;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(InMemoryProfileStore::default()),
            Arc::new(MockModelProvider),
            Arc::new(SyntheticPlaceDirectory),
            Arc::new(LogNotifier),
            SessionConfig {
                typing: TypingDelay::none(),
                history_debounce: Duration::from_secs(60),
                search_radius_km: 10.0,
            },
        )
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_owned(),
            email: "pat@example.com".to_owned(),
            display_name: "Pat".to_owned(),
        }
    }

    #[tokio::test]
    async fn open_get_close_lifecycle() {
        let registry = registry();
        let (id, session) = registry.open(None).await;

        let fetched = registry.get(id).await.expect("session registered");
        assert!(Arc::ptr_eq(&session, &fetched));

        assert!(registry.close(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.close(id).await, "second close is a no-op");
    }

    #[tokio::test]
    async fn login_is_remembered_until_logout() {
        let registry = registry();
        assert!(registry.remembered_login().await.is_none());

        let (id, _session) = registry.open(Some(identity())).await;
        let remembered = registry.remembered_login().await.expect("login recorded");
        assert_eq!(remembered.user_id, "user-1");

        registry.close(id).await;
        assert!(registry.remembered_login().await.is_none());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let registry = registry();
        let (first, _) = registry.open(None).await;
        let (second, _) = registry.open(None).await;
        assert_ne!(first, second);

        let session = registry.get(first).await.expect("first session");
        session.send_text("I have a headache").await;

        let other = registry.get(second).await.expect("second session");
        assert_eq!(other.transcript().await.len(), 1);
    }
}
