//! Backend collaborators consumed by the front-end.
//!
//! The input core never calls these; screens driven by it do. Each concern
//! is a small synchronous trait so the privileged backend (or a test double)
//! can be plugged in. Async notifications arrive as [`BackendEvent`] values
//! pushed by the host loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::SystemTime;

use log::Level;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

// =============================================================================
// Data
// =============================================================================

/// One entry of the game library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub id: String,
    pub title: String,
    pub playtime_seconds: u64,
    pub last_played: Option<SystemTime>,
    pub cover_path: Option<String>,
    pub categories: Vec<String>,
}

impl GameEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            playtime_seconds: 0,
            last_played: None,
            cover_path: None,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSink {
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioInfo {
    /// 0..=100
    pub volume: u8,
    pub is_muted: bool,
    pub sinks: Vec<AudioSink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    pub address: String,
    pub name: String,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BluetoothState {
    pub powered: bool,
    pub discovering: bool,
    pub devices: Vec<BluetoothDevice>,
}

/// Notifications pushed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    GameStarted(String),
    GameClosed,
    AudioInfoChanged(AudioInfo),
    BluetoothStateChanged(BluetoothState),
    AppConfigChanged { key: String, value: toml::Value },
}

// =============================================================================
// Traits
// =============================================================================

pub trait GameLibrary {
    fn games(&self) -> Result<Vec<GameEntry>, BackendError>;
}

/// Fire-and-forget process control. Completion arrives as `BackendEvent`.
pub trait ProcessControl {
    fn launch_game(&self, id: &str);
    fn close_game(&self);
}

pub trait AudioControl {
    fn audio_info(&self) -> Result<AudioInfo, BackendError>;
    fn set_volume(&self, percent: u8) -> Result<(), BackendError>;
    fn set_mute(&self, muted: bool) -> Result<(), BackendError>;
    fn set_default_sink(&self, name: &str) -> Result<(), BackendError>;
}

pub trait BluetoothControl {
    fn state(&self) -> Result<BluetoothState, BackendError>;
    fn start_discovery(&self) -> Result<(), BackendError>;
    fn stop_discovery(&self) -> Result<(), BackendError>;
    fn connect(&self, address: &str) -> Result<(), BackendError>;
    fn disconnect(&self, address: &str) -> Result<(), BackendError>;
}

/// Key-value app settings.
pub trait ConfigStore {
    fn app_config(&self) -> toml::Table;
    fn set_app_config(&self, key: &str, value: toml::Value);
}

/// Fire-and-forget log sink.
pub trait LogSink {
    fn log(&self, level: Level, message: &str);
}

/// Forwards to the `log` facade under the `frontend` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "frontend", level, "{}", message);
    }
}

// =============================================================================
// In-memory implementations
// =============================================================================

/// Static game list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibrary {
    games: Vec<GameEntry>,
}

impl InMemoryLibrary {
    pub fn new(games: Vec<GameEntry>) -> Self {
        Self { games }
    }

    pub fn find(&self, id: &str) -> Result<&GameEntry, BackendError> {
        self.games
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| BackendError::GameNotFound(id.to_string()))
    }
}

impl GameLibrary for InMemoryLibrary {
    fn games(&self) -> Result<Vec<GameEntry>, BackendError> {
        Ok(self.games.clone())
    }
}

/// Mixer state held in memory. Changes queue `AudioInfoChanged`.
#[derive(Debug, Default)]
pub struct InMemoryAudio {
    info: RefCell<AudioInfo>,
    pending: RefCell<Vec<BackendEvent>>,
}

impl InMemoryAudio {
    pub fn new(sinks: Vec<AudioSink>) -> Self {
        Self {
            info: RefCell::new(AudioInfo {
                volume: 50,
                is_muted: false,
                sinks,
            }),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn drain_events(&self) -> Vec<BackendEvent> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    fn changed(&self) {
        let info = self.info.borrow().clone();
        self.pending
            .borrow_mut()
            .push(BackendEvent::AudioInfoChanged(info));
    }
}

impl AudioControl for InMemoryAudio {
    fn audio_info(&self) -> Result<AudioInfo, BackendError> {
        Ok(self.info.borrow().clone())
    }

    fn set_volume(&self, percent: u8) -> Result<(), BackendError> {
        self.info.borrow_mut().volume = percent.min(100);
        self.changed();
        Ok(())
    }

    fn set_mute(&self, muted: bool) -> Result<(), BackendError> {
        self.info.borrow_mut().is_muted = muted;
        self.changed();
        Ok(())
    }

    fn set_default_sink(&self, name: &str) -> Result<(), BackendError> {
        {
            let mut info = self.info.borrow_mut();
            if !info.sinks.iter().any(|s| s.name == name) {
                return Err(BackendError::UnknownSink(name.to_string()));
            }
            for sink in info.sinks.iter_mut() {
                sink.is_default = sink.name == name;
            }
        }
        self.changed();
        Ok(())
    }
}

/// Adapter state held in memory. Changes queue `BluetoothStateChanged`.
#[derive(Debug, Default)]
pub struct InMemoryBluetooth {
    state: RefCell<BluetoothState>,
    pending: RefCell<Vec<BackendEvent>>,
}

impl InMemoryBluetooth {
    pub fn new(powered: bool, devices: Vec<BluetoothDevice>) -> Self {
        Self {
            state: RefCell::new(BluetoothState {
                powered,
                discovering: false,
                devices,
            }),
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn drain_events(&self) -> Vec<BackendEvent> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    fn powered(&self) -> Result<(), BackendError> {
        if self.state.borrow().powered {
            Ok(())
        } else {
            Err(BackendError::Unavailable("bluetooth adapter is off".to_string()))
        }
    }

    fn update<F>(&self, f: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut BluetoothState) -> Result<(), BackendError>,
    {
        self.powered()?;
        f(&mut self.state.borrow_mut())?;
        let state = self.state.borrow().clone();
        self.pending
            .borrow_mut()
            .push(BackendEvent::BluetoothStateChanged(state));
        Ok(())
    }

    fn set_connected(&self, address: &str, connected: bool) -> Result<(), BackendError> {
        self.update(|state| {
            let device = state
                .devices
                .iter_mut()
                .find(|d| d.address == address)
                .ok_or_else(|| BackendError::DeviceNotFound(address.to_string()))?;
            device.connected = connected;
            Ok(())
        })
    }
}

impl BluetoothControl for InMemoryBluetooth {
    fn state(&self) -> Result<BluetoothState, BackendError> {
        Ok(self.state.borrow().clone())
    }

    fn start_discovery(&self) -> Result<(), BackendError> {
        self.update(|state| {
            state.discovering = true;
            Ok(())
        })
    }

    fn stop_discovery(&self) -> Result<(), BackendError> {
        self.update(|state| {
            state.discovering = false;
            Ok(())
        })
    }

    fn connect(&self, address: &str) -> Result<(), BackendError> {
        self.set_connected(address, true)
    }

    fn disconnect(&self, address: &str) -> Result<(), BackendError> {
        self.set_connected(address, false)
    }
}

/// Settings held in memory; change notifications are queued.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    values: RefCell<HashMap<String, toml::Value>>,
    pending: RefCell<Vec<BackendEvent>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take queued `AppConfigChanged` notifications.
    pub fn drain_events(&self) -> Vec<BackendEvent> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn app_config(&self) -> toml::Table {
        self.values
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn set_app_config(&self, key: &str, value: toml::Value) {
        let changed = self.values.borrow().get(key) != Some(&value);
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        if changed {
            self.pending.borrow_mut().push(BackendEvent::AppConfigChanged {
                key: key.to_string(),
                value,
            });
        }
    }
}
