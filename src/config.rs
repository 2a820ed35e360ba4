//! Configuration loading and validation.
//!
//! Quill reads a single human-owned `quill.toml`. Every section is optional;
//! a missing file yields the defaults. Precedence: env vars > file > defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::normalizer::TerminalMark;
use crate::persona::PostMode;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::openai::DEFAULT_OPENAI_URL;

/// File name looked up inside [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "quill.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model selection and endpoints.
    pub models: ModelsConfig,
    /// Retry loop and generator limits.
    pub generation: GenerationConfig,
    /// Decoration margins and placement thresholds.
    pub style: StyleConfig,
    /// Persona source.
    pub persona: PersonaSource,
}

/// Model selection: a single `<provider>/<model>` spec plus endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Model spec (e.g. "ollama/llama3.2").
    pub default: String,
    /// Ollama server base URL.
    pub ollama_url: String,
    /// OpenAI-compatible chat completions endpoint.
    pub openai_url: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default: default_model(),
            ollama_url: DEFAULT_OLLAMA_URL.to_owned(),
            openai_url: DEFAULT_OPENAI_URL.to_owned(),
        }
    }
}

/// Generation loop settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum generator invocations per post.
    pub max_attempts: u32,
    /// Capacity of each recent-use history queue.
    pub history_capacity: usize,
    /// Per-call generator deadline in seconds.
    pub timeout_secs: u64,
    /// Token cap passed to the provider.
    pub max_tokens: u32,
    /// Punctuation appended to unterminated text.
    pub terminal_mark: TerminalMark,
    /// Initial post mode.
    pub mode: PostMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            history_capacity: default_history_capacity(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            terminal_mark: TerminalMark::default(),
            mode: PostMode::default(),
        }
    }
}

/// Decoration budget and emoji placement settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Remaining chars that must be exceeded before an emoji is considered.
    pub emoji_margin: usize,
    /// Remaining chars that must be exceeded before a hashtag is considered.
    pub hashtag_margin: usize,
    /// Draws below this value place the emoji as a prefix.
    pub emoji_prefix_below: f64,
    /// Draws below this value (and not below the prefix one) place it as a
    /// suffix. Draws above are dropped.
    pub emoji_suffix_below: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            emoji_margin: default_emoji_margin(),
            hashtag_margin: default_hashtag_margin(),
            emoji_prefix_below: default_emoji_prefix_below(),
            emoji_suffix_below: default_emoji_suffix_below(),
        }
    }
}

/// Where the persona comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonaSource {
    /// Persona TOML path. The built-in persona is used when absent.
    pub path: Option<PathBuf>,
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `generation.max_attempts` is zero.
    #[error("generation.max_attempts must be at least 1")]
    ZeroAttempts,
    /// `generation.history_capacity` is zero.
    #[error("generation.history_capacity must be at least 1")]
    ZeroHistory,
    /// `generation.timeout_secs` is zero.
    #[error("generation.timeout_secs must be at least 1")]
    ZeroTimeout,
    /// Placement thresholds are not ordered within `[0, 1]`.
    #[error("style thresholds must satisfy 0 <= prefix ({prefix}) <= suffix ({suffix}) <= 1")]
    Thresholds {
        /// Configured prefix threshold.
        prefix: f64,
        /// Configured suffix threshold.
        suffix: f64,
    },
}

// Default value functions for serde

fn default_model() -> String {
    "ollama/llama3.2".to_owned()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_history_capacity() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    90
}
fn default_max_tokens() -> u32 {
    160
}
fn default_emoji_margin() -> usize {
    4
}
fn default_hashtag_margin() -> usize {
    20
}
fn default_emoji_prefix_below() -> f64 {
    0.3
}
fn default_emoji_suffix_below() -> f64 {
    0.7
}

impl Config {
    /// Parse a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests never touch the process env.
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("QUILL_MODEL") {
            self.models.default = v;
        }
        if let Some(v) = env("QUILL_OLLAMA_URL") {
            self.models.ollama_url = v;
        }
        if let Some(v) = env("QUILL_MAX_ATTEMPTS") {
            match v.parse() {
                Ok(n) => self.generation.max_attempts = n,
                Err(_) => warn_invalid("QUILL_MAX_ATTEMPTS", &v),
            }
        }
        if let Some(v) = env("QUILL_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.generation.timeout_secs = n,
                Err(_) => warn_invalid("QUILL_TIMEOUT_SECS", &v),
            }
        }
        if let Some(v) = env("QUILL_MODE") {
            match v.parse() {
                Ok(mode) => self.generation.mode = mode,
                Err(_) => warn_invalid("QUILL_MODE", &v),
            }
        }
    }

    /// Check value ranges the type system does not cover.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.generation.history_capacity == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let prefix = self.style.emoji_prefix_below;
        let suffix = self.style.emoji_suffix_below;
        if !(0.0..=1.0).contains(&prefix) || !(0.0..=1.0).contains(&suffix) || prefix > suffix {
            return Err(ConfigError::Thresholds { prefix, suffix });
        }
        Ok(())
    }
}

fn warn_invalid(var: &str, value: &str) {
    tracing::warn!(var, value, "ignoring invalid env override");
}

/// Load the config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    Config::from_toml(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

/// Load the config at `path` if it exists, else defaults; then apply env
/// overrides from `env` and validate.
///
/// # Errors
///
/// Returns an error for unreadable or malformed files and invalid values.
pub fn load_or_default(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let mut config = match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "loading config from file");
            Config::from_toml(&contents)
                .with_context(|| format!("invalid config at {}", path.display()))?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Config::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read config at {}", path.display()))
        }
    };
    config.apply_overrides(env);
    config.validate()?;
    Ok(config)
}

/// Resolve the config file path: explicit path, then `QUILL_CONFIG_PATH`,
/// then `~/.quill/quill.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env("QUILL_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve the default config directory (`~/.quill/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".quill"))
}
