//! Tick-driven channel scheduler for the Sluice distribution network.
//!
//! A [`Channel`] decides, every active sub-tick, how much of which
//! resource moves from which source to which sink. The pieces, leaf first:
//!
//! - [`directory`]: builds and caches the channel's source and sink lists
//! - [`transfer`]: simulate-then-commit extraction and distribution
//! - [`priority`]: preemption of lower-priority endpoints in priority mode
//! - [`round_robin`]: rotating start offset for fair sink selection
//! - [`channel`]: the tick driver tying them together
//!
//! Everything outside the scheduler (world lookup, handlers, budgets) is
//! reached through [`sluice_core::ControllerContext`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod codec;
pub mod config;
pub mod directory;
pub mod priority;
pub mod report;
pub mod round_robin;
pub mod transfer;

pub use channel::Channel;
pub use codec::{decode_state, encode_state, ChannelState, CodecError};
pub use config::{
    parse_role, settings_from_json, settings_to_json, ChannelConfig, ChannelMode, ConfigError,
    ModeChoice, SchedulerConfig, MACRO_CYCLE, SUBTICK_PERIOD,
};
pub use directory::{Endpoint, EndpointCache};
pub use priority::is_preempted;
pub use report::{AbortReason, Delivery, TickReport, TransferRecord};
pub use round_robin::RoundRobin;
