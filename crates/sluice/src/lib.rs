//! Sluice: a tick-driven scheduler that moves resources across a logistics
//! network.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Sluice sub-crates. For most users, adding `sluice` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sluice::prelude::*;
//!
//! let mut channel = Channel::new();
//! channel.apply_update("mode", "priority").unwrap();
//! assert_eq!(channel.mode(), ChannelMode::Priority);
//!
//! // Persist and restore the channel's runtime state.
//! let mut buf = Vec::new();
//! encode_state(&mut buf, &channel.state()).unwrap();
//! let mut restored = Channel::new();
//! restored.restore(decode_state(&mut buf.as_slice()).unwrap());
//! assert_eq!(restored.state(), channel.state());
//!
//! // The lightweight config form only carries the mode.
//! let config = ChannelConfig::from_json(r#"{"mode":"DISTRIBUTE"}"#).unwrap();
//! restored.apply_config(&config);
//! assert_eq!(restored.mode(), ChannelMode::Distribute);
//! ```
//!
//! Ticking a channel needs a [`types::ControllerContext`] implementation
//! supplied by the host network; see [`engine::Channel::tick`].
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sluice-core` | IDs, stacks, endpoint settings, collaborator traits |
//! | [`engine`] | `sluice-engine` | Channel scheduler, cache, codec, config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`sluice-core`).
///
/// Contains resource stacks, endpoint settings, error types, and the
/// collaborator traits ([`types::ResourceHandler`],
/// [`types::ControllerContext`]).
pub use sluice_core as types;

/// The channel scheduler (`sluice-engine`).
///
/// [`engine::Channel`] is the tick driver; [`engine::EndpointCache`],
/// [`engine::RoundRobin`] and the transfer helpers are its building blocks.
pub use sluice_engine as engine;

/// Common imports for typical Sluice usage.
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use sluice_core::{
        Action, ChannelId, ConsumerId, ControllerContext, EndpointRef, EndpointRole,
        EndpointSettings, Position, RedstoneMode, ResourceHandler, ResourceSet, ResourceStack,
        ResourceType, Side,
    };

    // Errors
    pub use sluice_core::{SettingsError, TransferError};
    pub use sluice_engine::{CodecError, ConfigError};

    // Engine
    pub use sluice_engine::{
        decode_state, encode_state, Channel, ChannelConfig, ChannelMode, ChannelState,
        SchedulerConfig, TickReport,
    };
}
