//! Per-connector configuration: [`EndpointSettings`] and its builder.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettingsError;
use crate::id::{ResourceType, Side};
use crate::stack::ResourceStack;

/// Whether a connector feeds the network or drains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointRole {
    /// Extracts from the adjacent handler into the network.
    #[serde(rename = "EXT")]
    Source,
    /// Inserts from the network into the adjacent handler.
    #[serde(rename = "INS")]
    Sink,
}

/// Canonical role names, in ordinal order.
const ROLE_NAMES: [(&str, EndpointRole); 2] =
    [("EXT", EndpointRole::Source), ("INS", EndpointRole::Sink)];

impl EndpointRole {
    /// Canonical upper-case name (`EXT` / `INS`).
    pub fn name(self) -> &'static str {
        match self {
            EndpointRole::Source => ROLE_NAMES[0].0,
            EndpointRole::Sink => ROLE_NAMES[1].0,
        }
    }

    /// Look up a role by its canonical name. Exact match only.
    pub fn from_name(name: &str) -> Option<EndpointRole> {
        ROLE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, role)| *role)
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Redstone condition attached to a connector.
///
/// Evaluation is delegated to
/// [`ControllerContext::redstone_blocks`](crate::ControllerContext::redstone_blocks);
/// this type only carries the configured condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedstoneMode {
    /// Redstone has no effect.
    #[default]
    Ignored,
    /// Active only while the signal is off.
    Off,
    /// Active only while the signal is on.
    On,
    /// Active for one operation per rising edge.
    Pulse,
}

/// Configuration of one connector face.
///
/// Construct through [`EndpointSettings::source`] or [`EndpointSettings::sink`]
/// so that the invariants checked by [`validate`](Self::validate) hold.
/// Deserialized settings must be validated explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Source or sink.
    pub role: EndpointRole,
    /// Face of the handler to address; `None` addresses the handler as a whole.
    #[serde(default)]
    pub facing: Option<Side>,
    /// Maximum amount moved per successful operation.
    pub rate: i64,
    /// Sub-tick divisor; the endpoint is considered on sub-ticks `d` where
    /// `d % speed == 0`.
    pub speed: u32,
    /// Optional type filter. Amount is ignored when matching.
    #[serde(default)]
    pub matcher: Option<ResourceStack>,
    /// Floor (source) or ceiling (sink) on the handler's held quantity.
    #[serde(default)]
    pub threshold: Option<i64>,
    /// Higher wins.
    #[serde(default)]
    pub priority: i32,
    /// Colour signals that must be active on the network.
    #[serde(default)]
    pub color_mask: u32,
    /// Redstone condition.
    #[serde(default)]
    pub redstone: RedstoneMode,
}

impl EndpointSettings {
    /// Start building source settings.
    pub fn source() -> EndpointSettingsBuilder {
        EndpointSettingsBuilder::new(EndpointRole::Source)
    }

    /// Start building sink settings.
    pub fn sink() -> EndpointSettingsBuilder {
        EndpointSettingsBuilder::new(EndpointRole::Sink)
    }

    /// Check the structural invariants: positive rate, nonzero speed,
    /// nonnegative threshold.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rate <= 0 {
            return Err(SettingsError::NonPositiveRate { rate: self.rate });
        }
        if self.speed == 0 {
            return Err(SettingsError::ZeroSpeed);
        }
        if let Some(threshold) = self.threshold {
            if threshold < 0 {
                return Err(SettingsError::NegativeThreshold { threshold });
            }
        }
        Ok(())
    }

    /// `true` if `stack` passes this endpoint's type filter.
    pub fn accepts(&self, stack: &ResourceStack) -> bool {
        self.matcher.is_none_or(|m| m.is_same_type(stack))
    }

    /// The filtered resource type, if any.
    pub fn matched_type(&self) -> Option<ResourceType> {
        self.matcher.map(|m| m.resource)
    }

    /// `true` for sources.
    pub fn is_source(&self) -> bool {
        self.role == EndpointRole::Source
    }
}

/// Builder for [`EndpointSettings`].
///
/// Defaults: rate 1000, speed 1, no facing, no matcher, no threshold,
/// priority 0, empty colour mask, redstone ignored.
#[derive(Clone, Debug)]
pub struct EndpointSettingsBuilder {
    settings: EndpointSettings,
}

impl EndpointSettingsBuilder {
    /// Default maximum amount per operation.
    pub const DEFAULT_RATE: i64 = 1000;

    fn new(role: EndpointRole) -> Self {
        Self {
            settings: EndpointSettings {
                role,
                facing: None,
                rate: Self::DEFAULT_RATE,
                speed: 1,
                matcher: None,
                threshold: None,
                priority: 0,
                color_mask: 0,
                redstone: RedstoneMode::Ignored,
            },
        }
    }

    /// Address one face of the handler.
    pub fn facing(mut self, side: Side) -> Self {
        self.settings.facing = Some(side);
        self
    }

    /// Maximum amount per operation.
    pub fn rate(mut self, rate: i64) -> Self {
        self.settings.rate = rate;
        self
    }

    /// Sub-tick divisor.
    pub fn speed(mut self, speed: u32) -> Self {
        self.settings.speed = speed;
        self
    }

    /// Only move stacks of `resource`.
    pub fn matcher(mut self, resource: ResourceType) -> Self {
        self.settings.matcher = Some(ResourceStack::new(resource, 1));
        self
    }

    /// Floor (source) or ceiling (sink) quantity.
    pub fn threshold(mut self, count: i64) -> Self {
        self.settings.threshold = Some(count);
        self
    }

    /// Priority; higher wins.
    pub fn priority(mut self, priority: i32) -> Self {
        self.settings.priority = priority;
        self
    }

    /// Required colour signals.
    pub fn color_mask(mut self, mask: u32) -> Self {
        self.settings.color_mask = mask;
        self
    }

    /// Redstone condition.
    pub fn redstone(mut self, mode: RedstoneMode) -> Self {
        self.settings.redstone = mode;
        self
    }

    /// Validate and produce the settings.
    pub fn build(self) -> Result<EndpointSettings, SettingsError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
