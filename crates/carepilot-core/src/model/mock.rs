use async_trait::async_trait;

use super::{ModelProvider, ModelRequest};

/// Deterministic provider for development without an API key.
#[derive(Debug, Default)]
pub struct MockModelProvider;

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        Ok(format!(
            "CarePilot mock reply.\n\nSystem: {}\n\nUser: {}",
            request.system_prompt, request.user_prompt
        ))
    }

    async fn suggest_reply(&self, _prior_bot_message: &str) -> anyhow::Result<String> {
        Ok("Yes, please.".to_owned())
    }
}
