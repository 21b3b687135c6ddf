//! Configuration management for Savant
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/savant/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, SavantError};

/// Default system instruction, handed to the model on every completion
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert research assistant. \
Your purpose is to provide comprehensive answers to user requests. You have access to \
a specialized set of tools for analyzing the content of images and another set for \
researching topics on Wikipedia. Intelligently chain these tools together to fulfill \
the user's request. For example, if a user asks about an image, first analyze the \
image to understand what it is, then use that understanding to perform research.";

/// Main configuration for Savant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model backend configuration
    pub model: ModelConfig,
    /// Agent behavior configuration
    pub agent: AgentConfig,
    /// Tool execution configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Streaming configuration
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name used for completions
    /// Default: gemini-2.0-flash
    pub name: String,
    /// Base URL of the Gemini API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum think/act cycles per turn before the turn fails
    /// Default: 10
    pub max_steps: usize,
    /// System instruction handed to the model
    pub system_instruction: String,
    /// Whether to show debug output
    pub debug: bool,
}

/// Tool execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Per-call timeout for tool execution in seconds
    pub timeout_secs: u64,
}

/// Streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Whether to stream final answers in real-time
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
            streaming: StreamingConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: env::var("SAVANT_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            timeout_secs: 120,
            temperature: 0.0,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: env::var("SAVANT_MAX_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            debug: env::var("SAVANT_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("SAVANT_STREAMING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("savant")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(SavantError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| SavantError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SavantError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| SavantError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SavantError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| SavantError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Resolve the Gemini API key from the environment
    pub fn api_key() -> Result<String> {
        let _ = dotenvy::dotenv();
        env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(SavantError::MissingApiKey)
    }

    /// Update the model name
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model.name = model.into();
    }

    /// Update the per-turn iteration bound
    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.agent.max_steps = max_steps;
    }
}
