//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.tablepick/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::messages::{ConfiguredText, EnglishText, MessageKey};
use crate::core::table::StylePair;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TablePickConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub interactive: Option<bool>,
    pub read_buffer_size: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StyleConfig {
    pub background: Option<String>,
    pub foreground: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessagesConfig {
    pub instructions: Option<String>,
    pub selection_cancelled: Option<String>,
    pub row_indicator: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_READ_BUFFER_SIZE: usize = 16;
/// Smallest read that still holds a full `ESC [ A` sequence.
pub const MIN_READ_BUFFER_SIZE: usize = 3;

// ============================================================================
// CLI Overrides
// ============================================================================

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub batch: bool,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub interactive: bool,
    pub read_buffer_size: usize,
    pub timeout: Option<Duration>,
    pub style: StylePair,
    pub messages: MessagesConfig,
    pub log_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Text provider with the configured overrides over English defaults.
    pub fn text_provider(&self) -> ConfiguredText {
        let mut text = ConfiguredText::new(Box::new(EnglishText));
        let overrides = [
            (MessageKey::Instructions, &self.messages.instructions),
            (
                MessageKey::SelectionCancelled,
                &self.messages.selection_cancelled,
            ),
            (MessageKey::RowIndicator, &self.messages.row_indicator),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                text = text.with(key, value.clone());
            }
        }
        text
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.tablepick/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tablepick").join("config.toml"))
}

/// Load config from `~/.tablepick/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TablePickConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TablePickConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TablePickConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TablePickConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<TablePickConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TablePickConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# tablepick Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# interactive = true                 # false prints the table once and returns the first row
# read_buffer_size = 16              # bytes per keyboard read (minimum 3)
# timeout_secs = 60                  # cancel the selection after this long without input
# log_file = "/tmp/tablepick.log"

# [style]
# background = "cyan"                # TABLEPICK_BACKGROUND
# foreground = "black"               # TABLEPICK_FOREGROUND

# [messages]
# instructions = "Use ↑/↓ to move, Enter to select, Esc or q to cancel."
# selection_cancelled = "Selection cancelled."
# row_indicator = "Row {current} of {total}"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TablePickConfig, cli: &Overrides) -> ResolvedConfig {
    // Interactive: --batch → env → config → default
    let interactive = if cli.batch {
        false
    } else {
        std::env::var("TABLEPICK_INTERACTIVE")
            .ok()
            .and_then(|v| parse_bool(&v))
            .or(config.general.interactive)
            .unwrap_or(true)
    };

    // Colors: CLI → env → config → default
    let defaults = StylePair::default();
    let background = cli
        .background
        .clone()
        .or_else(|| std::env::var("TABLEPICK_BACKGROUND").ok())
        .or_else(|| config.style.background.clone())
        .unwrap_or(defaults.background);
    let foreground = cli
        .foreground
        .clone()
        .or_else(|| std::env::var("TABLEPICK_FOREGROUND").ok())
        .or_else(|| config.style.foreground.clone())
        .unwrap_or(defaults.foreground);

    // Timeout: CLI → env → config → none
    let timeout_secs = cli.timeout_secs.or_else(|| {
        std::env::var("TABLEPICK_TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .or(config.general.timeout_secs)
    });

    let read_buffer_size = config
        .general
        .read_buffer_size
        .unwrap_or(DEFAULT_READ_BUFFER_SIZE)
        .max(MIN_READ_BUFFER_SIZE);

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.general.log_file.as_ref().map(PathBuf::from));

    ResolvedConfig {
        interactive,
        read_buffer_size,
        timeout: timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs),
        style: StylePair {
            background,
            foreground,
        },
        messages: config.messages.clone(),
        log_file,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
