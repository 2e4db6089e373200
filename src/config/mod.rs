// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::PathBuf;
use config::{Config, ConfigError, Environment, File};

/// Configuration for the pretrained model and its registry entry
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Registry identifier of the model/tokenizer pair on the Hub
    pub registry_id: String,
    /// Directory where fetched model files are cached
    pub cache_directory: PathBuf,
}

/// Configuration for summary generation parameters
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Input is truncated (and padded) to this many tokens
    pub max_input_tokens: usize,
    /// Maximum number of summary tokens to generate
    pub max_summary_tokens: usize,
    /// Minimum number of summary tokens before EOS is allowed
    pub min_summary_tokens: usize,
    /// Number of beams kept alive during decoding
    pub beam_width: usize,
    /// Stop as soon as enough finished hypotheses exist
    pub early_stopping: bool,
    /// Size of n-grams that must not repeat in the output
    pub no_repeat_ngram: usize,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log file path
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Maps the configured level string onto a tracing level. Unknown
    /// values fall back to info; validation rejects them earlier.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Model-related settings
    pub model: ModelConfig,
    /// Generation-related settings
    pub generation: GenerationConfig,
    /// Server-related settings
    pub server: ServerConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. The PORT environment variable (server port only)
    /// 2. Environment variables prefixed with TEXTSUM_
    /// 3. Local config file (local.toml) if present
    /// 4. Default config file (default.toml)
    pub fn new() -> Result<Self, ConfigError> {
        // Check if current directory exists
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        // Create the local config path
        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        // Load and validate configuration
        let mut settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(Environment::with_prefix("TEXTSUM").separator("_"))
            .build()?
            .try_deserialize::<Settings>()?;

        // A bare PORT variable (the deployment convention) beats the config files
        if let Ok(port) = std::env::var("PORT") {
            settings.server.port = port.parse().map_err(|e| {
                ConfigError::Message(format!("Invalid PORT value '{}': {}", port, e))
            })?;
        }

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        // The registry identifier must at least look like "owner/name"
        if !self.model.registry_id.contains('/') {
            return Err(ConfigError::Message(
                format!("registry_id must be of the form owner/name, got: {}", self.model.registry_id)
            ));
        }

        // Create the model cache directory if it doesn't exist
        if !self.model.cache_directory.exists() {
            std::fs::create_dir_all(&self.model.cache_directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create model cache directory at {}: {}",
                    self.model.cache_directory.display(), e
                ))
            })?;
        }

        // Validate generation bounds
        if self.generation.max_input_tokens == 0 {
            return Err(ConfigError::Message(
                "max_input_tokens must be greater than 0".to_string()
            ));
        }

        if self.generation.max_summary_tokens == 0 {
            return Err(ConfigError::Message(
                "max_summary_tokens must be greater than 0".to_string()
            ));
        }

        if self.generation.min_summary_tokens > self.generation.max_summary_tokens {
            return Err(ConfigError::Message(format!(
                "min_summary_tokens ({}) must not exceed max_summary_tokens ({})",
                self.generation.min_summary_tokens, self.generation.max_summary_tokens
            )));
        }

        if self.generation.beam_width == 0 {
            return Err(ConfigError::Message(
                "beam_width must be greater than 0".to_string()
            ));
        }

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535, got: 0".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log file directory if configured and doesn't exist
        if let Some(log_file) = &self.logging.file {
            if let Some(parent) = log_file.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ConfigError::Message(format!(
                            "Failed to create log directory at {}: {}",
                            parent.display(), e
                        ))
                    })?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            model: ModelConfig {
                registry_id: "dps13/text-summarizer-model".to_string(),
                cache_directory: std::env::temp_dir(),
            },
            generation: GenerationConfig {
                max_input_tokens: 512,
                max_summary_tokens: 100,
                min_summary_tokens: 20,
                beam_width: 4,
                early_stopping: true,
                no_repeat_ngram: 2,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }

    #[test]
    fn test_valid_settings_pass_validation() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn test_registry_id_without_owner_is_rejected() {
        let mut settings = base_settings();
        settings.model.registry_id = "text-summarizer-model".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("owner/name"));
    }

    #[test]
    fn test_min_tokens_above_max_is_rejected() {
        let mut settings = base_settings();
        settings.generation.min_summary_tokens = 200;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_beam_width_is_rejected() {
        let mut settings = base_settings();
        settings.generation.beam_width = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut settings = base_settings();
        settings.logging.level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }
}
