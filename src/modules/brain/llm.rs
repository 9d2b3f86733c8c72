use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use tracing::{debug, info, warn};

use crate::config::app_config::LlmConfig;
use crate::errors::{AssistantError, AssistantResult};

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One completion for one fully assembled prompt.
    async fn complete(&self, prompt: &str) -> AssistantResult<String>;
}

/// OpenAI-compatible chat completions endpoint.
pub struct ChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
}

impl ChatModel {
    pub fn new(client: Client, cfg: &LlmConfig) -> Self {
        Self {
            client,
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature,
        })
    }
}

fn extract_content(body: &Value) -> Option<String> {
    body["choices"][0]["message"]["content"].as_str().map(str::to_string)
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl LanguageModel for ChatModel {
    // 单次调用，不重试：失败信息直接作为回答展示
    async fn complete(&self, prompt: &str) -> AssistantResult<String> {
        if self.api_key.is_empty() {
            return Err(AssistantError::Config("OPENAI_API_KEY missing. Check .env".to_string()));
        }

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        info!("🧠 [{}] Generating answer ({} prompt chars)...", self.model, prompt.len());
        debug!("\n================ LLM PROMPT ================\n{}\n============================================", prompt);

        let resp = self.client.post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            warn!("⚠️ {} API Error [{}]", self.model, status);
            return Err(AssistantError::LlmProvider(format!("[{}] {}", status, api_error_message(&text))));
        }

        let body: Value = serde_json::from_str(&text)?;
        extract_content(&body)
            .ok_or_else(|| AssistantError::LlmProvider("response has no choices[0].message.content".to_string()))
    }
}
