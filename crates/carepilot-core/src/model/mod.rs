mod aimlapi;
mod mock;

use async_trait::async_trait;

pub use aimlapi::AimlApiProvider;
pub use mock::MockModelProvider;

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String>;

    /// Short guess at what the user might type next, given the bot's last
    /// message. Callers treat failure as "no suggestion", never as an error
    /// worth surfacing.
    async fn suggest_reply(&self, prior_bot_message: &str) -> anyhow::Result<String>;
}
