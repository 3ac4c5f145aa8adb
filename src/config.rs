//! Window manager configuration.
//!
//! Read from the JSON file named by `SNAKEWM_CONFIG`, else `./snakewm.json`
//! when present, else built-in defaults. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::launcher::MenuLayout;
use crate::logging::LogConfig;
use crate::paint::DEFAULT_RADIUS;
use crate::render::{Gradient, Rgb};

pub const CONFIG_ENV: &str = "SNAKEWM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "snakewm.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmConfig {
    /// Root of the application directory tree
    pub apps_root: PathBuf,
    /// Screen size used by the headless fallback renderer
    pub screen: ScreenConfig,
    /// Pixel size of one terminal cell
    pub cell: ScreenConfig,
    pub background: BackgroundConfig,
    pub hotkeys: HotkeyConfig,
    pub menu: MenuLayout,
    pub paint: PaintConfig,
    pub frame_interval_ms: u64,
    /// Application identifiers loaded at startup, bottom window first
    pub autostart: Vec<String>,
    pub log: LogConfig,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            apps_root: PathBuf::from("apps"),
            screen: ScreenConfig {
                width: 1920.0,
                height: 1080.0,
            },
            cell: ScreenConfig {
                width: 8.0,
                height: 16.0,
            },
            background: BackgroundConfig::default(),
            hotkeys: HotkeyConfig::default(),
            menu: MenuLayout::default(),
            paint: PaintConfig::default(),
            frame_interval_ms: 16,
            autostart: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

impl WmConfig {
    /// Locate and load the configuration
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            return Self::from_path(default);
        }
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Clear colour
    pub color: Rgb,
    /// Full-screen gradient drawn over the clear colour; `null` disables it
    pub gradient: Option<Gradient>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: Rgb(0.0, 0.5, 0.5),
            gradient: Some(Gradient {
                top_left: Rgb(0.1, 0.1, 0.5),
                top_right: Rgb(0.0, 0.0, 0.3),
                bottom_left: Rgb(0.0, 0.5, 1.0),
                bottom_right: Rgb(0.0, 0.2, 0.8),
            }),
        }
    }
}

/// Hotkey names, e.g. "F1" or "Ctrl+Q"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub menu: String,
    pub paint: String,
    pub clear_paint: String,
    pub quit: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            menu: "F1".to_string(),
            paint: "F2".to_string(),
            clear_paint: "F3".to_string(),
            quit: "Ctrl+Q".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub radius: f64,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
        }
    }
}
