//! Channel configuration, editor description, and error types.
//!
//! [`ChannelMode`] names resolve through an immutable table built at
//! compile time. [`ChannelConfig`] is the lightweight JSON form of a
//! channel (mode only); the full persisted form lives in
//! [`codec`](crate::codec). Connector settings have their own JSON form,
//! validated on the way in.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use sluice_core::{EndpointRole, EndpointSettings, SettingsError};

/// Ticks in one macro-cycle of the delay counter.
pub const MACRO_CYCLE: i32 = 200 * 6;

/// A channel does work on every `SUBTICK_PERIOD`-th tick.
pub const SUBTICK_PERIOD: i32 = 10;

/// Editor tag under which the mode is exposed.
pub const TAG_MODE: &str = "mode";

// ── ChannelMode ────────────────────────────────────────────────────

/// Distribution policy of a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChannelMode {
    /// Higher-priority endpoints with overlapping contents preempt lower ones.
    Priority,
    /// Every eligible endpoint takes part; sinks share through round-robin.
    #[default]
    Distribute,
}

/// Canonical mode names, in ordinal order.
const MODE_NAMES: [(&str, ChannelMode); 2] = [
    ("PRIORITY", ChannelMode::Priority),
    ("DISTRIBUTE", ChannelMode::Distribute),
];

impl ChannelMode {
    /// All modes in ordinal order.
    pub const ALL: [ChannelMode; 2] = [ChannelMode::Priority, ChannelMode::Distribute];

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        MODE_NAMES[self.ordinal() as usize].0
    }

    /// Look up a mode by its canonical name. Exact match only.
    pub fn from_name(name: &str) -> Option<ChannelMode> {
        MODE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, mode)| *mode)
    }

    /// Position in [`ChannelMode::ALL`]; the persisted representation.
    pub fn ordinal(self) -> u8 {
        match self {
            ChannelMode::Priority => 0,
            ChannelMode::Distribute => 1,
        }
    }

    /// Inverse of [`ordinal`](Self::ordinal).
    pub fn from_ordinal(ordinal: u8) -> Option<ChannelMode> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for ChannelMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChannelMode::from_name(&value).ok_or(ConfigError::UnknownMode { name: value })
    }
}

impl From<ChannelMode> for String {
    fn from(mode: ChannelMode) -> Self {
        mode.name().to_string()
    }
}

// ── ChannelConfig ──────────────────────────────────────────────────

/// Lightweight config form of a channel: `{"mode": "PRIORITY"}`.
///
/// Timer and round-robin state are runtime state and deliberately absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Distribution policy.
    pub mode: ChannelMode,
}

impl ChannelConfig {
    /// Parse the JSON config form.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json {
            reason: e.to_string(),
        })
    }

    /// Render the JSON config form.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Json {
            reason: e.to_string(),
        })
    }
}

// ── Connector settings ─────────────────────────────────────────────

/// Parse a connector's JSON config form and validate it.
pub fn settings_from_json(json: &str) -> Result<EndpointSettings, ConfigError> {
    let settings: EndpointSettings = serde_json::from_str(json).map_err(|e| ConfigError::Json {
        reason: e.to_string(),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Render a connector's JSON config form.
pub fn settings_to_json(settings: &EndpointSettings) -> Result<String, ConfigError> {
    serde_json::to_string(settings).map_err(|e| ConfigError::Json {
        reason: e.to_string(),
    })
}

/// Parse an editor's role choice (`ext` / `INS`, any case).
pub fn parse_role(name: &str) -> Result<EndpointRole, ConfigError> {
    EndpointRole::from_name(&name.to_ascii_uppercase()).ok_or_else(|| ConfigError::UnknownRole {
        name: name.to_string(),
    })
}

// ── SchedulerConfig ────────────────────────────────────────────────

/// Tunables shared by every channel of a controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Cost charged to the controller's operation budget per committed
    /// transfer. Default: 100.
    pub operation_cost: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            operation_cost: 100,
        }
    }
}

// ── ModeChoice ─────────────────────────────────────────────────────

/// Description of the channel's one configurable option, for a settings
/// editor to render as a choice list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChoice {
    /// Tag to pass back to [`Channel::apply_update`](crate::Channel::apply_update).
    pub tag: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Currently selected mode.
    pub current: ChannelMode,
    /// Every selectable mode.
    pub options: &'static [ChannelMode],
}

impl ModeChoice {
    pub(crate) fn new(current: ChannelMode) -> Self {
        Self {
            tag: TAG_MODE,
            label: "Distribution mode",
            current,
            options: &ChannelMode::ALL,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors from reading channel or connector configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A mode name did not match any known mode.
    UnknownMode {
        /// The name as given.
        name: String,
    },
    /// A role name did not match any known role.
    UnknownRole {
        /// The name as given.
        name: String,
    },
    /// An editor update named an option this channel does not have.
    UnknownTag {
        /// The tag as given.
        tag: String,
    },
    /// The JSON document was malformed.
    Json {
        /// Parser diagnostic.
        reason: String,
    },
    /// Connector settings failed validation.
    Settings(SettingsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMode { name } => write!(f, "unknown channel mode '{name}'"),
            Self::UnknownRole { name } => write!(f, "unknown connector role '{name}'"),
            Self::UnknownTag { tag } => write!(f, "unknown option '{tag}'"),
            Self::Json { reason } => write!(f, "malformed config: {reason}"),
            Self::Settings(e) => write!(f, "settings: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Settings(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SettingsError> for ConfigError {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}
