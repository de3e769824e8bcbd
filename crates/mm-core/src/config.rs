//! Configuration management: JSON files with sensible defaults.
//!
//! Files live in the per-user config directory:
//!
//! - Windows: `%APPDATA%\monitor_manager`
//! - elsewhere: `~/.config/monitor_manager`
//!
//! `MONITOR_MANAGER_CONFIG_DIR` overrides both. Every file falls back to
//! its defaults when missing or malformed.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that replaces the platform config directory.
pub const CONFIG_DIR_ENV: &str = "MONITOR_MANAGER_CONFIG_DIR";

const APP_DIR_NAME: &str = "monitor_manager";

pub const SETTINGS_FILE: &str = "settings.json";
pub const SHORTCUTS_FILE: &str = "custom_shortcuts.json";
pub const FAVORITES_FILE: &str = "favorites.json";
pub const LOG_FILE: &str = "monitor_manager.log";

/// Longest accepted favorite name, in characters.
pub const MAX_FAVORITE_NAME_LEN: usize = 20;

const FAVORITE_NAME_FORBIDDEN: &[char] = &['\\', '/', '"', '\n', '\r', '\t'];

// ============================================================================
// Paths
// ============================================================================

/// Path to the config directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    platform_config_dir().join(APP_DIR_NAME)
}

#[cfg(windows)]
fn platform_config_dir() -> PathBuf {
    match std::env::var_os("APPDATA").filter(|v| !v.is_empty()) {
        Some(appdata) => PathBuf::from(appdata),
        None => home_dir().join("AppData").join("Roaming"),
    }
}

#[cfg(not(windows))]
fn platform_config_dir() -> PathBuf {
    home_dir().join(".config")
}

fn home_dir() -> PathBuf {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE)
}

pub fn shortcuts_path() -> PathBuf {
    config_dir().join(SHORTCUTS_FILE)
}

pub fn favorites_path() -> PathBuf {
    config_dir().join(FAVORITES_FILE)
}

pub fn log_path() -> PathBuf {
    config_dir().join(LOG_FILE)
}

/// Create the config directory if needed and return it.
pub fn ensure_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    let dir = config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

// ============================================================================
// JSON files
// ============================================================================

/// A config document stored as one pretty-printed JSON file.
pub trait JsonFile: Serialize + DeserializeOwned + Default {
    /// File name inside [`config_dir`].
    const FILE_NAME: &'static str;

    fn default_path() -> PathBuf {
        config_dir().join(Self::FILE_NAME)
    }

    /// Load from the config directory, falling back to defaults.
    fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`, falling back to defaults.
    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(value) => {
                    info!("Loaded {}", path.display());
                    value
                }
                Err(e) => {
                    warn!("Parse error in {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write to the config directory (creates it if needed).
    fn save(&self) -> Result<(), Box<dyn Error>> {
        self.save_to(&Self::default_path())
    }

    /// Write to `path`, creating parent directories.
    fn save_to(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(path, to_pretty_json(self)?)?;
        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// JSON with a 4-space indent and a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, Box<dyn Error>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(String::from_utf8(buf)?)
}

// ============================================================================
// Settings
// ============================================================================

/// Color theme. Persisted for compatibility; the terminal UI ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }

    /// Next value, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::System,
            Theme::System => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the window goes to the tray. Persisted for compatibility only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrayOn {
    #[default]
    None,
    Close,
    Minimize,
    Both,
}

impl TrayOn {
    pub fn as_str(self) -> &'static str {
        match self {
            TrayOn::None => "none",
            TrayOn::Close => "close",
            TrayOn::Minimize => "minimize",
            TrayOn::Both => "both",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TrayOn::None => TrayOn::Close,
            TrayOn::Close => TrayOn::Minimize,
            TrayOn::Minimize => TrayOn::Both,
            TrayOn::Both => TrayOn::None,
        }
    }
}

impl fmt::Display for TrayOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application settings with defaults for every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub tray_on: TrayOn,

    /// Show a Windows toast notification after each switch.
    pub toast_enabled: bool,

    /// Debug-level logging.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            tray_on: TrayOn::None,
            toast_enabled: true,
            verbose: false,
        }
    }
}

impl JsonFile for Settings {
    const FILE_NAME: &'static str = SETTINGS_FILE;
}

// ============================================================================
// Switch targets
// ============================================================================

/// A persisted `(monitor index, input name)` pair.
///
/// Serialized as a two-element array: `[1, "HDMI1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, String)", into = "(usize, String)")]
pub struct SwitchTarget {
    pub monitor_index: usize,
    pub input_name: String,
}

impl SwitchTarget {
    pub fn new(monitor_index: usize, input_name: impl Into<String>) -> Self {
        Self {
            monitor_index,
            input_name: input_name.into(),
        }
    }
}

impl From<(usize, String)> for SwitchTarget {
    fn from((monitor_index, input_name): (usize, String)) -> Self {
        Self {
            monitor_index,
            input_name,
        }
    }
}

impl From<SwitchTarget> for (usize, String) {
    fn from(t: SwitchTarget) -> Self {
        (t.monitor_index, t.input_name)
    }
}

impl fmt::Display for SwitchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor {} → {}", self.monitor_index, self.input_name)
    }
}

// ============================================================================
// Shortcuts
// ============================================================================

/// Hotkey combo → switch target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shortcuts(pub BTreeMap<String, SwitchTarget>);

impl Shortcuts {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SwitchTarget)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, combo: &str) -> Option<&SwitchTarget> {
        self.0.get(combo)
    }

    /// Bind `combo`, replacing any previous binding. Returns the old target.
    pub fn insert(&mut self, combo: impl Into<String>, target: SwitchTarget) -> Option<SwitchTarget> {
        self.0.insert(combo.into(), target)
    }

    pub fn remove(&mut self, combo: &str) -> Option<SwitchTarget> {
        self.0.remove(combo)
    }
}

impl JsonFile for Shortcuts {
    const FILE_NAME: &'static str = SHORTCUTS_FILE;
}

// ============================================================================
// Favorites
// ============================================================================

/// Why a favorite name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteNameError {
    Empty,
    TooLong,
    ForbiddenChar(char),
    /// Carries the existing name it collides with.
    Duplicate(String),
}

impl fmt::Display for FavoriteNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoriteNameError::Empty => write!(f, "Please enter a favorite name"),
            FavoriteNameError::TooLong => write!(
                f,
                "Name must be {} characters or less",
                MAX_FAVORITE_NAME_LEN
            ),
            FavoriteNameError::ForbiddenChar(c) => {
                write!(f, "Name cannot contain '{}' character", c.escape_default())
            }
            FavoriteNameError::Duplicate(existing) => {
                write!(f, "A favorite named '{}' already exists", existing)
            }
        }
    }
}

impl Error for FavoriteNameError {}

/// Favorite name → switch target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(pub BTreeMap<String, SwitchTarget>);

impl Favorites {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SwitchTarget)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<(&String, &SwitchTarget)> {
        let lower = name.trim().to_lowercase();
        self.0.iter().find(|(n, _)| n.to_lowercase() == lower)
    }

    /// Check a name for use as a new favorite, or as the new name of
    /// `exclude` when renaming.
    pub fn validate_name(&self, name: &str, exclude: Option<&str>) -> Result<(), FavoriteNameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FavoriteNameError::Empty);
        }
        if name.chars().count() > MAX_FAVORITE_NAME_LEN {
            return Err(FavoriteNameError::TooLong);
        }
        if let Some(c) = name.chars().find(|c| FAVORITE_NAME_FORBIDDEN.contains(c)) {
            return Err(FavoriteNameError::ForbiddenChar(c));
        }

        let lower = name.to_lowercase();
        let excluded = exclude.map(|e| e.trim().to_lowercase());
        for existing in self.0.keys() {
            let existing_lower = existing.to_lowercase();
            if existing_lower == lower && excluded.as_deref() != Some(existing_lower.as_str()) {
                return Err(FavoriteNameError::Duplicate(existing.clone()));
            }
        }
        Ok(())
    }

    /// Validate and insert a new favorite under the trimmed name.
    pub fn add(&mut self, name: &str, target: SwitchTarget) -> Result<(), FavoriteNameError> {
        self.validate_name(name, None)?;
        self.0.insert(name.trim().to_string(), target);
        Ok(())
    }

    /// Replace favorite `old` with `new_name` → `target`.
    pub fn rename(
        &mut self,
        old: &str,
        new_name: &str,
        target: SwitchTarget,
    ) -> Result<(), FavoriteNameError> {
        self.validate_name(new_name, Some(old))?;
        if let Some(key) = self.get(old).map(|(k, _)| k.clone()) {
            self.0.remove(&key);
        }
        self.0.insert(new_name.trim().to_string(), target);
        Ok(())
    }

    /// Remove by name, ignoring case.
    pub fn remove(&mut self, name: &str) -> Option<(String, SwitchTarget)> {
        let key = self.get(name).map(|(k, _)| k.clone())?;
        self.0.remove(&key).map(|t| (key, t))
    }
}

impl JsonFile for Favorites {
    const FILE_NAME: &'static str = FAVORITES_FILE;
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
