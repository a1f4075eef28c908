use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ModelProvider, ModelRequest};

const COMPLETE_MAX_TOKENS: u32 = 500;
const COMPLETE_TEMPERATURE: f32 = 0.7;
const SUGGEST_MODEL: &str = "gpt-4o-mini";
const SUGGEST_MAX_TOKENS: u32 = 50;
const SUGGEST_TEMPERATURE: f32 = 0.5;

const SUGGEST_SYSTEM_PROMPT: &str = r#"You are an expert at predicting what a user would say next in a conversation with a healthcare assistant.
Based on the assistant's last message, generate a short, natural-sounding, and relevant question or reply that a human user would likely type.
- Keep the reply concise (usually one sentence).
- Do not act as an assistant. You are generating a reply *for* the user.
- Do not wrap the reply in quotes.
- Examples:
  - Assistant: "Would you like to schedule an appointment?" -> User reply: "Yes, please."
  - Assistant: "I can help you check your symptoms. What symptoms are you experiencing?" -> User reply: "I have a headache and a fever."
  - Assistant: "Here's a health tip for you: Stay hydrated..." -> User reply: "Thanks for the tip!"
"#;

/// OpenAI-compatible chat-completions provider pointed at the AI/ML API
/// host by default.
#[derive(Debug, Clone)]
pub struct AimlApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AimlApiProvider {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    async fn chat(&self, payload: &ChatCompletionRequest<'_>) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("model returned no choices"))?;

        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl ModelProvider for AimlApiProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            max_tokens: COMPLETE_MAX_TOKENS,
            temperature: COMPLETE_TEMPERATURE,
        };

        self.chat(&payload).await
    }

    async fn suggest_reply(&self, prior_bot_message: &str) -> anyhow::Result<String> {
        let user_prompt = format!("The assistant said: \"{prior_bot_message}\"");
        let payload = ChatCompletionRequest {
            model: SUGGEST_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUGGEST_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: SUGGEST_MAX_TOKENS,
            temperature: SUGGEST_TEMPERATURE,
        };

        self.chat(&payload).await
    }
}
