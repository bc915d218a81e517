//! # Preference Store
//!
//! Named, typed configuration values consumed by the immersive controller.
//!
//! The controller only ever sees the [`PrefStore`] trait. Two stores ship with
//! the crate:
//!
//! - [`MemoryPrefStore`]: a plain map, for embedding hosts and tests
//! - [`TomlPrefStore`]: a flat TOML file that writes through on every `set`
//!
//! Reads fall back to the registered default of a key (see [`default_value`])
//! when the store holds no value, so an empty store behaves like a fresh
//! profile. Settings that shape timing and geometry are snapshotted once into
//! [`ImmersiveSettings`] when a controller is built.

pub mod memory_store;
pub mod settings;
pub mod toml_store;

pub use memory_store::MemoryPrefStore;
pub use settings::ImmersiveSettings;
pub use toml_store::TomlPrefStore;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Preference key names.
pub mod keys {
    /// Whether entering fullscreen turns on immersive mode.
    pub const IMMERSIVE_FULLSCREEN_ENABLED: &str = "immersive-fullscreen-enabled";
    /// Delay before hiding once the last reveal reason is gone.
    pub const AUTO_HIDE_DELAY_MS: &str = "auto-hide-delay-ms";
    /// Height of the hover hot zone along the top edge.
    pub const TOP_EDGE_SENSITIVITY_PX: &str = "top-edge-sensitivity-px";
    /// Length of the show/hide transition.
    pub const ANIMATION_DURATION_MS: &str = "animation-duration-ms";
    pub const SHOW_ON_ADDRESS_BAR_FOCUS: &str = "show-on-address-bar-focus";
    pub const SHOW_ON_KEYBOARD_ACTIVITY: &str = "show-on-keyboard-activity";
    /// Set once the user has been through immersive mode at least once.
    pub const HAS_SEEN_INTRODUCTION: &str = "has-seen-introduction";
    /// Lets the legacy toolbar preference veto immersive mode.
    pub const RESPECT_LEGACY_FULLSCREEN_PREF: &str = "respect-legacy-fullscreen-pref";
    /// Legacy "Always Show Toolbar in Full Screen".
    pub const SHOW_FULLSCREEN_TOOLBAR: &str = "show-fullscreen-toolbar";
}

pub const DEFAULT_AUTO_HIDE_DELAY_MS: i64 = 2000;
pub const DEFAULT_ANIMATION_DURATION_MS: i64 = 300;
pub const DEFAULT_TOP_EDGE_SENSITIVITY_PX: i64 = 5;

/// A stored preference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(value) => Some(*value),
            PrefValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PrefValue::Int(value) => Some(*value),
            PrefValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(value) => write!(f, "{}", value),
            PrefValue::Int(value) => write!(f, "{}", value),
        }
    }
}

/// Registered default for a known key; `None` for unknown keys.
pub fn default_value(key: &str) -> Option<PrefValue> {
    let value = match key {
        keys::IMMERSIVE_FULLSCREEN_ENABLED => PrefValue::Bool(true),
        keys::AUTO_HIDE_DELAY_MS => PrefValue::Int(DEFAULT_AUTO_HIDE_DELAY_MS),
        keys::TOP_EDGE_SENSITIVITY_PX => PrefValue::Int(DEFAULT_TOP_EDGE_SENSITIVITY_PX),
        keys::ANIMATION_DURATION_MS => PrefValue::Int(DEFAULT_ANIMATION_DURATION_MS),
        keys::SHOW_ON_ADDRESS_BAR_FOCUS => PrefValue::Bool(true),
        keys::SHOW_ON_KEYBOARD_ACTIVITY => PrefValue::Bool(false),
        keys::HAS_SEEN_INTRODUCTION => PrefValue::Bool(false),
        keys::RESPECT_LEGACY_FULLSCREEN_PREF => PrefValue::Bool(true),
        keys::SHOW_FULLSCREEN_TOOLBAR => PrefValue::Bool(false),
        _ => return None,
    };
    Some(value)
}

/// Errors raised by preference stores.
#[derive(Debug, Error)]
pub enum PrefError {
    #[error("Failed to access preference file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse preference file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Backing store for named preferences.
///
/// Implementations only need raw `get`/`set`; the typed getters apply the
/// registered defaults and treat a value of the wrong type as missing.
pub trait PrefStore: Send {
    /// Raw stored value, without defaults.
    fn get(&self, key: &str) -> Option<PrefValue>;

    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), PrefError>;

    fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .and_then(|value| value.as_bool())
            .or_else(|| default_value(key).and_then(|value| value.as_bool()))
            .unwrap_or(false)
    }

    fn get_int(&self, key: &str) -> i64 {
        self.get(key)
            .and_then(|value| value.as_int())
            .or_else(|| default_value(key).and_then(|value| value.as_int()))
            .unwrap_or(0)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), PrefError> {
        self.set(key, PrefValue::Bool(value))
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), PrefError> {
        self.set(key, PrefValue::Int(value))
    }
}
