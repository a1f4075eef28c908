//! Append-only log of chat turns. The single source of truth for what the
//! conversation looks like and for what gets summarized into history.

use tokio::sync::RwLock;

use crate::types::Message;

/// Ordered sequence of messages for one session. Appends go to the end;
/// the only bulk mutation is a full replacement, used for logout resets and
/// for loading a past conversation back into view.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: RwLock<Vec<Message>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: RwLock::new(messages),
        }
    }

    pub async fn append(&self, message: Message) {
        self.messages.write().await.push(message);
    }

    /// Swaps the whole log in one step. Readers never observe a partially
    /// replaced sequence.
    pub async fn replace_all(&self, messages: Vec<Message>) {
        *self.messages.write().await = messages;
    }

    pub async fn snapshot(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// The last `count` messages in log order.
    pub async fn tail(&self, count: usize) -> Vec<Message> {
        let messages = self.messages.read().await;
        let start = messages.len().saturating_sub(count);
        messages[start..].to_vec()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}
