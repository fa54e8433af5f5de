use crate::error::ConfigError;
use secrecy::SecretString;

#[derive(Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gitlab: GitLabConfig,
    pub llm: LlmConfig,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct GitLabConfig {
    pub host: String,
    pub token: SecretString,
}

/// Backend selection is a closed union resolved once at startup. Nothing
/// outside `llm::backend_from_config` branches on the provider again.
#[derive(Clone)]
pub enum LlmConfig {
    OpenAi {
        api_key: SecretString,
        model: String,
    },
    Ollama {
        url: String,
        model: String,
    },
}

const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
const DEFAULT_OLLAMA_URL: &str = "http://ollama:11434";
const DEFAULT_OLLAMA_MODEL: &str = "codellama:13b";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".into()))?,
            },
            gitlab: GitLabConfig {
                host: std::env::var("GITLAB_HOST")
                    .unwrap_or_else(|_| "https://gitlab.com".to_string()),
                token: std::env::var("GITLAB_TOKEN")
                    .map(SecretString::from)
                    .map_err(|_| ConfigError::MissingRequired("GITLAB_TOKEN".into()))?,
            },
            llm: LlmConfig::from_env()?,
        })
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = std::env::var("AI_PROVIDER")
            .unwrap_or_else(|_| "ollama".to_string())
            .to_lowercase();

        match provider.as_str() {
            "openai" => Ok(Self::OpenAi {
                api_key: std::env::var("OPENAI_API_KEY")
                    .map(SecretString::from)
                    .map_err(|_| ConfigError::MissingRequired("OPENAI_API_KEY".into()))?,
                model: std::env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            }),
            "ollama" => Ok(Self::Ollama {
                url: std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
                model: std::env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            }),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::Ollama {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 3000);
        assert_eq!(server.host, "0.0.0.0");
    }

    #[test]
    fn test_default_llm_config_is_ollama() {
        match LlmConfig::default() {
            LlmConfig::Ollama { url, model } => {
                assert_eq!(url, "http://ollama:11434");
                assert_eq!(model, "codellama:13b");
            }
            LlmConfig::OpenAi { .. } => panic!("default provider should be ollama"),
        }
    }
}
