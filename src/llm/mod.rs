pub mod ollama;
pub mod openai;

use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use ollama::OllamaBackend;
use openai::OpenAiBackend;

/// A model backend turns prompts into raw text. Parsing the text is the
/// caller's job: backend unreliability (network, timeouts) and response-shape
/// unreliability are separate failure domains.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// The one place provider identity is examined. Credentials were already
/// validated when the config was built; after this the process only sees
/// the trait.
pub fn backend_from_config(config: &LlmConfig) -> Box<dyn ModelBackend> {
    match config {
        LlmConfig::OpenAi { api_key, model } => {
            Box::new(OpenAiBackend::new(api_key.clone(), model.clone()))
        }
        LlmConfig::Ollama { url, model } => {
            tracing::info!(url = %url, model = %model, "using Ollama provider");
            Box::new(OllamaBackend::new(url.clone(), model.clone()))
        }
    }
}
