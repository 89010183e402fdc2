use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docrouter service.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Root directory of the archive that routed documents land in.
    pub archive_root: PathBuf,
    /// Default OCR language pack passed to the OCR tool when a request omits
    /// one (`deu+eng+rus` unless overridden). `None` disables OCR by default.
    pub default_ocr_languages: Option<String>,
    /// Executable invoked for OCR (defaults to `ocrmypdf` on PATH).
    pub ocr_command: String,
    /// Optional page-count ceiling above which OCR is skipped.
    pub max_ocr_pages: Option<usize>,
    /// Timeout in seconds for the outbound workflow resume callback.
    pub resume_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            archive_root: PathBuf::from(load_env("ARCHIVE_ROOT")?),
            default_ocr_languages: load_env_optional("OCR_LANGUAGES")
                .or_else(|| Some("deu+eng+rus".to_string())),
            ocr_command: load_env_optional("OCR_COMMAND")
                .unwrap_or_else(|| "ocrmypdf".to_string()),
            max_ocr_pages: load_env_optional("MAX_OCR_PAGES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_OCR_PAGES".into()))
                })
                .transpose()?,
            resume_timeout_secs: load_env_optional("RESUME_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("RESUME_TIMEOUT_SECS".into()))
                })
                .transpose()?
                .unwrap_or(30),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        archive_root = %config.archive_root.display(),
        ocr_languages = ?config.default_ocr_languages,
        ocr_command = %config.ocr_command,
        max_ocr_pages = ?config.max_ocr_pages,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
