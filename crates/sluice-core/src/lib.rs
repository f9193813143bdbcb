//! Core types and collaborator traits for the Sluice distribution scheduler.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: identifiers, resource
//! stacks, per-connector settings, error types, and the two traits through
//! which the scheduler talks to the outside world ([`ResourceHandler`] and
//! [`ControllerContext`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod settings;
pub mod stack;
pub mod traits;

pub use error::{SettingsError, TransferError};
pub use id::{ChannelId, ConsumerId, EndpointRef, Position, ResourceType, Side};
pub use settings::{EndpointRole, EndpointSettings, EndpointSettingsBuilder, RedstoneMode};
pub use stack::ResourceStack;
pub use traits::{
    can_connect, resolve_endpoint, Action, ConnectorMap, ControllerContext, ResourceHandler,
    ResourceSet,
};
