/// Configuration for the translation pipeline.
///
/// Resolved once at process start and passed by reference into the
/// components that need it; nothing below the entry point reads environment
/// state on its own.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GLOSSARY_PATH: &str = "/Resources/glossary.csv";
pub const DEFAULT_VERIFY_BATCH: usize = 10;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const DROPBOX_API_BASE_URL: &str = "https://api.dropboxapi.com";
const DROPBOX_CONTENT_BASE_URL: &str = "https://content.dropboxapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_openai_base")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropboxConfig {
    pub app_key: String,
    pub app_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_glossary_path")]
    pub glossary_path: String,
    #[serde(default = "default_dropbox_api_base")]
    pub api_base_url: String,
    #[serde(default = "default_dropbox_content_base")]
    pub content_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    pub dropbox: DropboxConfig,
    /// How many unmatched entities are submitted for verification per run.
    /// `None` submits all of them.
    #[serde(default = "default_verify_batch")]
    pub verify_batch_limit: Option<usize>,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// Call once at process start (after loading `.env` if desired);
    /// missing secrets fail fast with the variable name.
    pub fn from_env() -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            std::env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let optional = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                model: optional("OPENAI_MODEL").unwrap_or_else(default_model),
                base_url: default_openai_base(),
            },
            dropbox: DropboxConfig {
                app_key: required("DROPBOX_APP_KEY")?,
                app_secret: required("DROPBOX_APP_SECRET")?,
                refresh_token: required("DROPBOX_REFRESH_TOKEN")?,
                glossary_path: optional("GLOSSARY_PATH").unwrap_or_else(default_glossary_path),
                api_base_url: default_dropbox_api_base(),
                content_base_url: default_dropbox_content_base(),
            },
            verify_batch_limit: match optional("VERIFY_BATCH") {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(limit) => Some(limit),
                    Err(_) => {
                        log::warn!("ignoring unparsable VERIFY_BATCH value {raw:?}");
                        default_verify_batch()
                    }
                },
                None => default_verify_batch(),
            },
        })
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_openai_base() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_glossary_path() -> String {
    DEFAULT_GLOSSARY_PATH.to_string()
}

fn default_dropbox_api_base() -> String {
    DROPBOX_API_BASE_URL.to_string()
}

fn default_dropbox_content_base() -> String {
    DROPBOX_CONTENT_BASE_URL.to_string()
}

fn default_verify_batch() -> Option<usize> {
    Some(DEFAULT_VERIFY_BATCH)
}
