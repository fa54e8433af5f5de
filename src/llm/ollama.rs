use crate::error::LlmError;
use crate::llm::ModelBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local inference has no inherent deadline, so every request carries a hard
/// wall-clock timeout.
const REQUEST_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f64 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 2000;

pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        // The generate endpoint takes one flat prompt, so the system prompt
        // is prepended and the JSON instruction repeated at the end.
        let prompt = format!(
            "{}\n\n{}\n\nRemember to respond with valid JSON only.",
            system, user
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                num_predict: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    return LlmError::Timeout {
                        provider: "ollama",
                        secs: REQUEST_TIMEOUT_SECS,
                    };
                }
                if e.is_connect() {
                    tracing::error!(
                        url = %self.base_url,
                        "cannot connect to Ollama. Is Ollama running?"
                    );
                }
                LlmError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::InvalidResponse(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Invalid response: {}", e)))?;

        Ok(generate_response.response)
    }
}
