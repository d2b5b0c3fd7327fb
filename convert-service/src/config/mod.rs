use config::ConfigError;
use secrecy::Secret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upload limit (10MB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Room for multipart framing and the `format` field on top of the image.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub generation: GenerationSettings,
    pub upload: UploadSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Missing keys are tolerated at startup and reported per request.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: usize,
    /// Transport-level body cap. Defaults to the file limit plus framing room.
    #[serde(default)]
    pub max_request_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// Comma-separated origins. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: String,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_GEMINI_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_file_size_bytes() -> usize {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            max_request_bytes: None,
        }
    }
}

impl GeminiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UploadSettings {
    pub fn request_body_limit(&self) -> usize {
        self.max_request_bytes
            .unwrap_or(self.max_file_size_bytes + MULTIPART_OVERHEAD_BYTES)
    }
}

impl CorsSettings {
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ConvertConfig {
    /// Load from the `configuration` file and `APP__*` variables.
    ///
    /// `GEMINI_API_KEY` overrides `APP__GEMINI__API_KEY` when set.
    pub fn load() -> Result<Self, AppError> {
        let settings = core_config::Config::with_sources(config::Config::builder()).build()?;

        let mut config = ConvertConfig {
            common: settings.clone().try_deserialize()?,
            gemini: section(&settings, "gemini")?,
            generation: section(&settings, "generation")?,
            upload: section(&settings, "upload")?,
            cors: section(&settings, "cors")?,
        };

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.gemini.api_key = Some(Secret::new(key));
            }
        }

        Ok(config)
    }
}

/// Deserialize a nested table, falling back to its defaults when absent.
fn section<T>(settings: &config::Config, key: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match settings.get::<T>(key) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(e),
    }
}
