//! Configuration loading for ReadFirst
//!
//! The configuration is an optional `config.json` placed next to the
//! executable. Missing keys are filled from built-in defaults (a shallow
//! merge of the top level and the `window` object). A file that cannot be
//! read or decoded falls back to the defaults as a whole, never per field.

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_TITLE, FONT_DEFAULT_POINT_SIZE, LOCK_DEFAULT_SECONDS,
    LOCK_MAX_SECONDS, LOCK_MIN_SECONDS, RULES_DEFAULT_PATH, WINDOW_DEFAULT_HEIGHT, WINDOW_DEFAULT_WIDTH,
};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: WINDOW_DEFAULT_WIDTH,
            height: WINDOW_DEFAULT_HEIGHT,
        }
    }
}

/// Application configuration, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Window title
    pub title: String,
    /// Countdown duration in seconds (LOCK_MIN_SECONDS..=LOCK_MAX_SECONDS)
    pub lock_seconds: u64,
    /// Fixed window size
    pub window: WindowSize,
    /// Body text size of the rules area
    pub font_point_size: u32,
    /// Markdown file holding the rules, relative to the executable directory
    pub requirements_markdown: String,
}

/// On-disk shape after merging; `lock_seconds` is signed so that zero and
/// negative values can be coerced instead of rejected.
///
/// `lock_seconds` must be a JSON integer. `null` or a float such as `5.0`
/// fails decoding and discards the whole file, where a lenient reader would
/// truncate the float and keep the other fields.
#[derive(Debug, Deserialize)]
struct RawConfig {
    title: String,
    lock_seconds: i64,
    window: WindowSize,
    font_point_size: u32,
    requirements_markdown: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            lock_seconds: LOCK_DEFAULT_SECONDS,
            window: WindowSize::default(),
            font_point_size: FONT_DEFAULT_POINT_SIZE,
            requirements_markdown: RULES_DEFAULT_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load the override at `path`, falling back to defaults on any problem
    ///
    /// Never fails: a missing file is the normal case and a broken one is
    /// logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "No configuration at {} - using built-in defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from_path(path) {
            Ok(config) => {
                info!("Configuration loaded from: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring configuration file: {:#}. Using built-in defaults.", e);
                Self::default()
            }
        }
    }

    /// Load and merge the override at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Failed to read file
    /// - JSON parsing fails or the top level is not an object
    /// - A merged field has the wrong type or an out-of-range value
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    /// Parse and merge a JSON override
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(contents).context("Failed to parse config file")?;
        let merged = merge_defaults(value)?;
        let raw: RawConfig =
            serde_json::from_value(merged).context("Invalid value in config file")?;
        raw.try_into()
    }

    /// The built-in defaults as a JSON object, the base of every merge
    fn defaults_json() -> Map<String, Value> {
        match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = anyhow::Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        if raw.window.width == 0 || raw.window.height == 0 {
            bail!(
                "Window size must be positive (got {}x{})",
                raw.window.width,
                raw.window.height
            );
        }
        if raw.font_point_size == 0 {
            bail!("font_point_size must be positive");
        }

        let lock_seconds = u64::try_from(raw.lock_seconds)
            .unwrap_or(0)
            .clamp(LOCK_MIN_SECONDS, LOCK_MAX_SECONDS);
        if i64::try_from(lock_seconds).ok() != Some(raw.lock_seconds) {
            warn!(
                "lock_seconds {} outside {}..={} - using {}",
                raw.lock_seconds, LOCK_MIN_SECONDS, LOCK_MAX_SECONDS, lock_seconds
            );
        }

        Ok(Self {
            title: raw.title,
            lock_seconds,
            window: raw.window,
            font_point_size: raw.font_point_size,
            requirements_markdown: raw.requirements_markdown,
        })
    }
}

/// Fill keys absent from `value` with defaults
///
/// Top-level keys are merged shallowly. A `window` entry that is missing or
/// not an object is replaced wholesale; otherwise its missing sub-keys are
/// filled in. Keys unknown to the defaults are left alone.
fn merge_defaults(value: Value) -> Result<Value> {
    let Value::Object(mut data) = value else {
        bail!("Config file must contain a JSON object");
    };

    let defaults = Config::defaults_json();
    for (key, default) in &defaults {
        data.entry(key.clone()).or_insert_with(|| default.clone());
    }

    let default_window = defaults.get("window").cloned().unwrap_or(Value::Null);
    match data.get_mut("window") {
        Some(Value::Object(window)) => {
            if let Value::Object(default_window) = default_window {
                for (key, default) in default_window {
                    window.entry(key).or_insert(default);
                }
            }
        }
        _ => {
            data.insert("window".to_string(), default_window);
        }
    }

    Ok(Value::Object(data))
}

/// Directory that config and rules paths are resolved against
///
/// This is the directory of the running executable, or the current
/// directory when that cannot be determined.
pub fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Standard location of the config file
pub fn config_path() -> PathBuf {
    base_dir().join(CONFIG_FILE_NAME)
}
