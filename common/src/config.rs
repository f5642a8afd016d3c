use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration-specific errors. All of them are fatal and surface before any stage runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required credential: {var} ({purpose})")]
    MissingCredential { var: String, purpose: String },

    #[error("Topic must not be empty")]
    EmptyTopic,

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration file invalid: {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Cannot find config directory")]
    NoConfigDir,
}

/// Generative text provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" | "chatgpt" => Ok(Provider::OpenAi),
            _ => Err(ConfigError::InvalidValue {
                field: "provider".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GOOGLE_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pptx,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pptx" | "powerpoint" => Ok(OutputFormat::Pptx),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pptx => "pptx",
            OutputFormat::Markdown => "md",
        }
    }
}

/// API keys for the external backends. Every field is optional here; which ones are
/// required is decided by [`DeckConfig::generative_key`].
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub image_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(v: &Option<String>) -> &'static str {
            if v.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("google_api_key", &mask(&self.google_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("search_api_key", &mask(&self.search_api_key))
            .field("search_engine_id", &mask(&self.search_engine_id))
            .field("image_api_key", &mask(&self.image_api_key))
            .finish()
    }
}

/// Run configuration, constructed once at startup and passed by reference to each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    pub provider: Provider,
    pub model: Option<String>,
    pub credentials: Credentials,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub concurrency: usize,
    pub max_results_per_backend: usize,
    pub context_char_budget: usize,
    pub prompt_excerpt_chars: usize,
    pub min_image_width: u32,
    pub min_image_height: u32,
    /// Image search results inspected per slide.
    pub image_candidates: usize,
    /// Largest image download accepted, in bytes.
    pub max_image_bytes: usize,
    pub duckduckgo_enabled: bool,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            credentials: Credentials::default(),
            request_timeout_secs: 30,
            max_retries: 2,
            concurrency: 1,
            max_results_per_backend: 5,
            context_char_budget: 2000,
            prompt_excerpt_chars: 1500,
            min_image_width: 400,
            min_image_height: 300,
            image_candidates: 5,
            max_image_bytes: 10 * 1024 * 1024,
            duckduckgo_enabled: true,
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
        }
    }
}

impl DeckConfig {
    /// Get default config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("deckgen").join("config.json"))
    }

    /// Load configuration from `path`, or from the default location when `path` is `None`.
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::config_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    reason: "file not found".to_string(),
                });
            }
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
        let config: DeckConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let creds = &mut self.credentials;
        if let Some(v) = credential(&lookup, "GOOGLE_API_KEY") {
            creds.google_api_key = Some(v);
        }
        if let Some(v) = credential(&lookup, "OPENAI_API_KEY") {
            creds.openai_api_key = Some(v);
        }
        if let Some(v) = credential(&lookup, "GOOGLE_SEARCH_API_KEY") {
            creds.search_api_key = Some(v);
        }
        if let Some(v) = credential(&lookup, "CUSTOM_SEARCH_ENGINE_ID") {
            creds.search_engine_id = Some(v);
        }
        if let Some(v) = credential(&lookup, "GOOGLE_IMAGE_API_KEY") {
            creds.image_api_key = Some(v);
        }

        if let Some(v) = setting(&lookup, "DECKGEN_PROVIDER") {
            self.provider = v.parse()?;
        }
        if let Some(v) = setting(&lookup, "DECKGEN_MODEL") {
            self.model = Some(v);
        }
        if let Some(v) = setting(&lookup, "DECKGEN_JOBS") {
            self.concurrency = parse_number("DECKGEN_JOBS", &v)?;
        }
        if let Some(v) = setting(&lookup, "DECKGEN_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = setting(&lookup, "DECKGEN_FORMAT") {
            self.format = v.parse()?;
        }
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// The generative AI key. This is the only credential the pipeline cannot run without.
    pub fn generative_key(&self) -> Result<&str, ConfigError> {
        let key = match self.provider {
            Provider::Gemini => self.credentials.google_api_key.as_deref(),
            Provider::OpenAi => self.credentials.openai_api_key.as_deref(),
        };
        key.ok_or_else(|| ConfigError::MissingCredential {
            var: self.provider.key_var().to_string(),
            purpose: format!("{} content generation", self.provider.as_str()),
        })
    }

    /// Key and engine id for the credentialed web search, if both are configured.
    pub fn search_credentials(&self) -> Option<(&str, &str)> {
        let creds = &self.credentials;
        Some((
            creds.search_api_key.as_deref()?,
            creds.search_engine_id.as_deref()?,
        ))
    }

    /// Key and engine id for image search. The image key falls back to the search key.
    pub fn image_credentials(&self) -> Option<(&str, &str)> {
        let creds = &self.credentials;
        let key = creds
            .image_api_key
            .as_deref()
            .or(creds.search_api_key.as_deref())?;
        Some((key, creds.search_engine_id.as_deref()?))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generative_key()?;
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Read a credential, treating blank values and unedited template placeholders as unset.
fn credential<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = setting(lookup, name)?;
    if value.contains("YOUR_") {
        tracing::warn!("{name} still holds a template placeholder, ignoring it");
        return None;
    }
    Some(value)
}

fn setting<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number(field: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}
