//! Collaborator traits: the handler and controller-context boundary.
//!
//! The scheduler never looks at the world directly. Everything spatial
//! (positions, chunk loading, block lookup) and every side effect on the
//! outside world goes through these two traits.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::id::{ChannelId, ConsumerId, EndpointRef, Position, ResourceType, Side};
use crate::settings::EndpointSettings;
use crate::stack::ResourceStack;

/// Whether a handler call is a dry run or takes effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Report what would happen; change nothing.
    Simulate,
    /// Perform the transfer.
    Execute,
}

impl Action {
    /// `true` for [`Action::Execute`].
    pub fn execute(self) -> bool {
        self == Action::Execute
    }

    /// `true` for [`Action::Simulate`].
    pub fn simulate(self) -> bool {
        self == Action::Simulate
    }
}

/// Set of resource types currently held by a handler face.
pub type ResourceSet = SmallVec<[ResourceType; 4]>;

/// Connector topology of one channel, in enumeration order.
pub type ConnectorMap = IndexMap<EndpointRef, EndpointSettings>;

/// An external object that stores a resource.
///
/// Methods take `&self`: handlers are owned by the environment and are
/// shared between every endpoint that addresses them, so implementations
/// that mutate on [`Action::Execute`] use interior mutability.
pub trait ResourceHandler {
    /// Diagnostic identity used in error messages.
    fn name(&self) -> &str;

    /// Total quantity held on `facing`, counting only stacks that pass
    /// `filter` (type-only) when one is given.
    fn quantity(&self, facing: Option<Side>, filter: Option<&ResourceStack>) -> i64;

    /// Extract up to `amount` of whatever the handler chooses.
    ///
    /// Returns the extracted stack (empty when nothing could be taken).
    fn extract(&self, amount: i64, facing: Option<Side>, action: Action) -> ResourceStack;

    /// Insert `stack`. Returns the leftover that was not absorbed.
    fn insert(&self, stack: &ResourceStack, facing: Option<Side>, action: Action)
        -> ResourceStack;

    /// Resource types currently held on `facing`.
    fn contents(&self, facing: Option<Side>) -> ResourceSet;
}

/// The environment a channel is ticked in.
///
/// Supplied by the network controller on every tick.
pub trait ControllerContext {
    /// World position of a connector block, if it is still part of the network.
    fn resolve_position(&self, consumer: ConsumerId) -> Option<Position>;

    /// Whether `position` is loaded and may be touched.
    fn is_loaded(&self, position: Position) -> bool;

    /// Handler at `position`, addressed through `facing`.
    fn handler(&self, position: Position, facing: Option<Side>) -> Option<&dyn ResourceHandler>;

    /// Whether the network's active colour signals satisfy `mask`.
    fn matches_color(&self, mask: u32) -> bool;

    /// Whether the redstone condition in `settings` blocks the connector at
    /// `position` right now.
    fn redstone_blocks(&self, position: Position, settings: &EndpointSettings) -> bool;

    /// Charge `cost` against the controller's operation budget.
    ///
    /// Returns `false`, and charges nothing, when the budget is short.
    fn check_and_consume_operation_cost(&mut self, cost: u64) -> bool;

    /// Connectors attached to `channel` directly.
    fn direct_connectors(&self, channel: ChannelId) -> ConnectorMap;

    /// Connectors reachable on `channel` through routing.
    fn routed_connectors(&self, channel: ChannelId) -> ConnectorMap;
}

/// Resolve the handler behind a connector face, checking that its block
/// is loaded.
///
/// The handler sits one block from the connector, through
/// `endpoint.side`. Returns the connector's own position alongside the
/// handler because gating is evaluated at the connector.
pub fn resolve_endpoint<'a, C>(
    ctx: &'a C,
    endpoint: &EndpointRef,
    settings: &EndpointSettings,
) -> Option<(Position, &'a dyn ResourceHandler)>
where
    C: ControllerContext + ?Sized,
{
    let connector = ctx.resolve_position(endpoint.consumer)?;
    let target = connector.offset(endpoint.side);
    if !ctx.is_loaded(target) {
        return None;
    }
    let handler = ctx.handler(target, settings.facing)?;
    Some((connector, handler))
}

/// Whether a connector at `position` would find a handler through `side`.
///
/// Used by network code deciding if a cable may attach.
pub fn can_connect<C>(ctx: &C, position: Position, side: Side) -> bool
where
    C: ControllerContext + ?Sized,
{
    ctx.handler(position.offset(side), Some(side.opposite()))
        .is_some()
}
