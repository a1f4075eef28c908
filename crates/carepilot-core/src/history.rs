//! Debounced background persistence of conversation summaries into the
//! profile document. Best effort: failures are logged and swallowed, the
//! conversation is never interrupted for a history write.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::message_log::MessageLog;
use crate::profile::ProfileStore;
use crate::types::{ChatHistoryItem, Identity, Message, ProfileData, Sender};

pub const DEFAULT_HISTORY_DEBOUNCE: Duration = Duration::from_secs(5);

/// Logs at or below this length are greetings plus at most one exchange,
/// not worth a history entry.
const MIN_MESSAGES_FOR_HISTORY: usize = 2;
/// Skip persisting when the user's side, concatenated, is this short.
const TRIVIAL_USER_TEXT_CHARS: usize = 10;
const USER_MESSAGES_IN_SUMMARY: usize = 5;
const BOT_REPLIES_IN_SUMMARY: usize = 3;
const TOPIC_WORD_COUNT: usize = 5;
const HISTORY_ITEM_CAP: usize = 10;
const SNAPSHOT_MESSAGES: usize = 10;

/// Watches one session's message log. Every mutation re-arms a debounce
/// timer; only a quiet period triggers a write.
pub struct HistoryPersister {
    store: Arc<dyn ProfileStore>,
    log: Arc<MessageLog>,
    profile: Arc<RwLock<ProfileData>>,
    identity: Option<Identity>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    /// Log length at the last successful save. A write only happens once
    /// the log has grown past this, so a flush right after a fired timer
    /// does not store the same window twice.
    persisted_len: Arc<AtomicUsize>,
}

impl HistoryPersister {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        log: Arc<MessageLog>,
        profile: Arc<RwLock<ProfileData>>,
        identity: Option<Identity>,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            log,
            profile,
            identity,
            debounce,
            pending: Mutex::new(None),
            persisted_len: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Signals one log mutation: cancels any pending write and starts a
    /// fresh debounce window. No-op for unauthenticated sessions.
    pub async fn poke(&self) {
        let Some(identity) = self.identity.clone() else {
            return;
        };

        let store = Arc::clone(&self.store);
        let log = Arc::clone(&self.log);
        let profile = Arc::clone(&self.profile);
        let persisted_len = Arc::clone(&self.persisted_len);
        let debounce = self.debounce;

        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            persist_now(store, log, profile, identity, persisted_len).await;
        }));
    }

    /// Persists immediately, cancelling the pending timer. Called on logout
    /// so a quiet-period write is not lost with the session.
    pub async fn flush(&self) {
        let Some(identity) = self.identity.clone() else {
            return;
        };

        {
            let mut pending = self.pending.lock().await;
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }

        persist_now(
            Arc::clone(&self.store),
            Arc::clone(&self.log),
            Arc::clone(&self.profile),
            identity,
            Arc::clone(&self.persisted_len),
        )
        .await;
    }

    /// Marks the log's current length as already stored. Called after a
    /// saved conversation is swapped back into the log, which would
    /// otherwise persist again as a fresh entry.
    pub async fn rebaseline(&self) {
        let len = self.log.len().await;
        self.persisted_len.store(len, Ordering::SeqCst);
    }
}

async fn persist_now(
    store: Arc<dyn ProfileStore>,
    log: Arc<MessageLog>,
    profile: Arc<RwLock<ProfileData>>,
    identity: Identity,
    persisted_len: Arc<AtomicUsize>,
) {
    let messages = log.snapshot().await;
    if messages.len() <= persisted_len.load(Ordering::SeqCst) {
        debug!(
            message_count = messages.len(),
            "log unchanged since last save"
        );
        return;
    }

    let Some(item) = build_history_item(&messages) else {
        debug!(
            message_count = messages.len(),
            "conversation too small to persist"
        );
        return;
    };

    // The cached profile is committed only once the store has accepted
    // the write; a failed or cancelled save leaves it untouched.
    let updated = {
        let mut updated = profile.read().await.clone();
        prepend_history(&mut updated, item.clone());
        updated
    };

    if let Err(error) = store.save_profile(&identity, &updated).await {
        warn!(?error, user_id = %identity.user_id, "chat history save failed");
        return;
    }

    prepend_history(&mut *profile.write().await, item);
    persisted_len.store(messages.len(), Ordering::SeqCst);
    debug!(user_id = %identity.user_id, "chat history saved");
}

fn prepend_history(profile: &mut ProfileData, item: ChatHistoryItem) {
    let history = &mut profile.ai_personalization.chat_history;
    history.insert(0, item);
    history.truncate(HISTORY_ITEM_CAP);
}

/// Derives one history entry from the log, or nothing when the exchange is
/// too small to be worth keeping.
fn build_history_item(messages: &[Message]) -> Option<ChatHistoryItem> {
    if messages.len() <= MIN_MESSAGES_FOR_HISTORY {
        return None;
    }

    let user_contents: Vec<&str> = messages
        .iter()
        .filter(|message| message.sender == Sender::User)
        .map(|message| message.content.as_str())
        .collect();
    let recent_user =
        &user_contents[user_contents.len().saturating_sub(USER_MESSAGES_IN_SUMMARY)..];

    let user_text = recent_user.join(" ");
    if user_text.chars().count() <= TRIVIAL_USER_TEXT_CHARS {
        return None;
    }

    let bot_contents: Vec<&str> = messages
        .iter()
        .filter(|message| message.is_bot_text())
        .map(|message| message.content.as_str())
        .collect();
    let recent_bot = &bot_contents[bot_contents.len().saturating_sub(BOT_REPLIES_IN_SUMMARY)..];

    let snapshot_start = messages.len().saturating_sub(SNAPSHOT_MESSAGES);

    Some(ChatHistoryItem {
        id: Uuid::new_v4(),
        topic: derive_topic(&user_text),
        date: Utc::now(),
        summary: format!(
            "User: {} | Assistant: {}",
            recent_user.join(" / "),
            recent_bot.join(" / ")
        ),
        messages: messages[snapshot_start..].to_vec(),
    })
}

fn derive_topic(user_text: &str) -> String {
    let words: Vec<&str> = user_text
        .split_whitespace()
        .take(TOPIC_WORD_COUNT)
        .collect();
    format!("{}...", words.join(" "))
}
