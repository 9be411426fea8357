//! Configuration file management
//!
//! Loads TOML configuration and provides input settings.
//! Default config path: ~/.config/lutris-input/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Button;

/// Environment variable that overrides the config path.
pub const CONFIG_ENV: &str = "LUTRIS_INPUT_CONFIG";

/// Input settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Gamepad settings
    pub gamepad: GamepadConfig,
    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

/// Which sticks drive d-pad emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickSource {
    /// Left stick only.
    #[default]
    Left,
    /// Dominant axis across left and right sticks.
    Both,
}

/// Physical button index bound to a canonical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadBinding {
    pub index: u8,
    pub button: Button,
}

/// Gamepad settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    /// Stick deflection needed to count as a direction (default: 0.5)
    pub analog_threshold: f32,
    /// Autorepeat interval while a button is held, in milliseconds (default: 150)
    pub autorepeat_ms: u64,
    /// Stick(s) used for d-pad emulation
    pub stick: StickSource,
    /// Physical index -> canonical button
    pub buttons: Vec<PadBinding>,
    /// Dedicated SUPER (guide/home) index
    pub super_button: u8,
    /// Chord that stands in for SUPER on pads without the dedicated button
    pub super_chord: Vec<u8>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            analog_threshold: 0.5,
            autorepeat_ms: 150,
            stick: StickSource::Left,
            buttons: vec![
                PadBinding { index: 0, button: Button::A },
                PadBinding { index: 1, button: Button::B },
                PadBinding { index: 2, button: Button::X },
                PadBinding { index: 3, button: Button::Y },
                PadBinding { index: 4, button: Button::L1 },
                PadBinding { index: 5, button: Button::R1 },
                PadBinding { index: 12, button: Button::Up },
                PadBinding { index: 13, button: Button::Down },
                PadBinding { index: 14, button: Button::Left },
                PadBinding { index: 15, button: Button::Right },
            ],
            super_button: 16,
            super_chord: vec![8, 9],
        }
    }
}

impl GamepadConfig {
    pub fn autorepeat_interval(&self) -> Duration {
        Duration::from_millis(self.autorepeat_ms)
    }

    /// Physical index bound to `button`, if any.
    pub fn index_of(&self, button: Button) -> Option<u8> {
        self.buttons
            .iter()
            .find(|b| b.button == button)
            .map(|b| b.index)
    }
}

/// Key name bound to a canonical button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key name: "ArrowUp", "PageDown", "a", ...
    pub key: String,
    pub button: Button,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, button: Button) -> Self {
        Self {
            key: key.into(),
            button,
        }
    }
}

/// Keyboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    pub bindings: Vec<KeyBinding>,
    /// Presses of a held key closer together than this are OS repeat
    /// (terminals that report no key release). 0 turns the filter off.
    pub repeat_gap_ms: u64,
}

impl KeyboardConfig {
    pub fn repeat_gap(&self) -> Duration {
        Duration::from_millis(self.repeat_gap_ms)
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            bindings: vec![
                KeyBinding::new("ArrowUp", Button::Up),
                KeyBinding::new("ArrowDown", Button::Down),
                KeyBinding::new("ArrowLeft", Button::Left),
                KeyBinding::new("ArrowRight", Button::Right),
                KeyBinding::new("a", Button::A),
                KeyBinding::new("b", Button::B),
                KeyBinding::new("x", Button::X),
                KeyBinding::new("y", Button::Y),
                KeyBinding::new("PageUp", Button::L1),
                KeyBinding::new("PageDown", Button::R1),
            ],
            repeat_gap_ms: 100,
        }
    }
}

impl InputConfig {
    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        // 1. LUTRIS_INPUT_CONFIG environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. User config: ~/.config/lutris-input/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("lutris-input").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        None
    }

    /// Load configuration with priority:
    /// 1. LUTRIS_INPUT_CONFIG environment variable
    /// 2. ~/.config/lutris-input/config.toml
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load and validate settings from `path`.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: InputConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the input pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pad = &self.gamepad;
        if !(pad.analog_threshold > 0.0 && pad.analog_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "gamepad.analog_threshold must be between 0 and 1, got {}",
                pad.analog_threshold
            )));
        }
        if pad.autorepeat_ms == 0 {
            return Err(ConfigError::Invalid(
                "gamepad.autorepeat_ms must be greater than 0".to_string(),
            ));
        }
        if pad.super_chord.is_empty() {
            return Err(ConfigError::Invalid(
                "gamepad.super_chord must name at least one button".to_string(),
            ));
        }
        let mut seen = Vec::with_capacity(pad.buttons.len());
        for binding in &pad.buttons {
            if binding.index >= 32 {
                return Err(ConfigError::Invalid(format!(
                    "gamepad button index {} is out of range",
                    binding.index
                )));
            }
            if seen.contains(&binding.index) {
                return Err(ConfigError::Invalid(format!(
                    "gamepad button index {} is bound twice",
                    binding.index
                )));
            }
            seen.push(binding.index);
        }
        Ok(())
    }
}
