use reqwest::Client;
use serde_json::json;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::app_config::RetrievalConfig;
use crate::errors::{AssistantError, AssistantResult};

const MAX_ATTEMPTS: u32 = 3;
// BERT 类模型最多 512 token，截断过长的输入
const MAX_INPUT_CHARS: usize = 4000;

/// OpenAI-compatible `/embeddings` client (text-embeddings-inference, vLLM, OpenAI...).
pub struct Embedder {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl Embedder {
    pub fn new(client: Client, cfg: &RetrievalConfig) -> Self {
        Self {
            client,
            api_key: env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            api_base: cfg.embedding_base_url.clone(),
            model: cfg.embedding_model.clone(),
        }
    }

    pub async fn embed(&self, text: &str) -> AssistantResult<Vec<f32>> {
        let safe_text: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let url = format!("{}/embeddings", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "input": safe_text,
            "encoding_format": "float"
        });

        let mut last_error = AssistantError::Embedding("no attempt made".to_string());

        for attempt in 1..=MAX_ATTEMPTS {
            let mut req = self.client.post(&url).json(&body);
            if !self.api_key.is_empty() {
                req = req.header("Authorization", format!("Bearer {}", self.api_key));
            }

            match req.send().await {
                Ok(resp) => {
                    if resp.status().is_success() {
                        match resp.json::<serde_json::Value>().await {
                            Ok(resp_json) => match parse_embedding(&resp_json) {
                                Some(v) => {
                                    if attempt > 1 {
                                        info!("✅ Embedding recovered on attempt {}", attempt);
                                    }
                                    return Ok(v);
                                }
                                None => {
                                    last_error = AssistantError::Embedding("response has no data[0].embedding".to_string())
                                }
                            },
                            Err(e) => last_error = AssistantError::Embedding(format!("Failed to parse JSON: {}", e)),
                        }
                    } else {
                        let status_code = resp.status();
                        let err_text = resp.text().await.unwrap_or_default();
                        last_error = AssistantError::Embedding(format!("API Error [{}]: {}", status_code, err_text));
                        warn!("⚠️ Embedding API Error (Attempt {}/{}): {}", attempt, MAX_ATTEMPTS, last_error);
                    }
                }
                Err(e) => {
                    warn!("⚠️ Embedding Network Error (Attempt {}/{}): {}", attempt, MAX_ATTEMPTS, e);
                    last_error = AssistantError::Http(e);
                }
            }

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
        }

        Err(last_error)
    }
}

fn parse_embedding(resp_json: &serde_json::Value) -> Option<Vec<f32>> {
    let data = resp_json["data"][0]["embedding"].as_array()?;
    let v: Vec<f32> = data.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect();
    if v.len() == data.len() && !v.is_empty() { Some(v) } else { None }
}
