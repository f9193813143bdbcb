//! Test utilities and mock collaborators for Sluice development.
//!
//! Provides [`MockController`], an in-memory [`ControllerContext`], and the
//! [`MockHandler`] tank fixture. Connectors are laid out on a line: consumer
//! `n` sits at `(4n, 64, 0)` and its handler one block east.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::MockHandler;

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use sluice_core::{
    ChannelId, ConnectorMap, ConsumerId, ControllerContext, EndpointRef, EndpointSettings,
    Position, RedstoneMode, ResourceHandler, ResourceStack, ResourceType, Side,
};

/// In-memory [`ControllerContext`].
///
/// Everything is loaded, no redstone is blocking, no colours are active
/// and the operation budget is unlimited until configured otherwise.
/// Counts handler lookups and connector enumerations so tests can assert
/// that a call path stayed away from the environment.
pub struct MockController {
    positions: HashMap<ConsumerId, Position>,
    unloaded: HashSet<Position>,
    handlers: HashMap<Position, Box<dyn ResourceHandler>>,
    redstone_blocked: HashSet<Position>,
    active_colors: u32,
    budget: Option<u64>,
    charged: u64,
    unload_on_charge: Option<Position>,
    direct: HashMap<ChannelId, ConnectorMap>,
    routed: HashMap<ChannelId, ConnectorMap>,
    handler_lookups: Cell<usize>,
    enumerations: Cell<usize>,
}

impl MockController {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            unloaded: HashSet::new(),
            handlers: HashMap::new(),
            redstone_blocked: HashSet::new(),
            active_colors: 0,
            budget: None,
            charged: 0,
            unload_on_charge: None,
            direct: HashMap::new(),
            routed: HashMap::new(),
            handler_lookups: Cell::new(0),
            enumerations: Cell::new(0),
        }
    }

    /// Where consumer `id` sits.
    pub fn connector_position(id: u32) -> Position {
        Position::new(id as i32 * 4, 64, 0)
    }

    /// Where the handler of consumer `id` sits.
    pub fn handler_position(id: u32) -> Position {
        Self::connector_position(id).offset(Side::East)
    }

    fn install(&mut self, id: u32, handler: impl ResourceHandler + 'static) -> EndpointRef {
        self.positions
            .insert(ConsumerId(id), Self::connector_position(id));
        self.handlers
            .insert(Self::handler_position(id), Box::new(handler));
        EndpointRef::new(ConsumerId(id), Side::East)
    }

    /// Add a directly attached connector with its handler.
    pub fn connect(
        &mut self,
        channel: ChannelId,
        id: u32,
        settings: EndpointSettings,
        handler: impl ResourceHandler + 'static,
    ) -> EndpointRef {
        let key = self.install(id, handler);
        self.direct
            .entry(channel)
            .or_default()
            .insert(key, settings);
        key
    }

    /// Add a connector reachable only through routing.
    pub fn connect_routed(
        &mut self,
        channel: ChannelId,
        id: u32,
        settings: EndpointSettings,
        handler: impl ResourceHandler + 'static,
    ) -> EndpointRef {
        let key = self.install(id, handler);
        self.routed
            .entry(channel)
            .or_default()
            .insert(key, settings);
        key
    }

    /// Replace the settings of an existing direct connector.
    pub fn reconfigure(&mut self, channel: ChannelId, id: u32, settings: EndpointSettings) {
        let key = EndpointRef::new(ConsumerId(id), Side::East);
        if let Some(entry) = self
            .direct
            .get_mut(&channel)
            .and_then(|map| map.get_mut(&key))
        {
            *entry = settings;
        }
    }

    /// Remove a connector from every map of `channel`. Its handler stays.
    pub fn disconnect(&mut self, channel: ChannelId, id: u32) {
        let key = EndpointRef::new(ConsumerId(id), Side::East);
        for maps in [&mut self.direct, &mut self.routed] {
            if let Some(map) = maps.get_mut(&channel) {
                map.shift_remove(&key);
            }
        }
    }

    /// Mark consumer `id`'s handler block as unloaded.
    pub fn unload(&mut self, id: u32) {
        self.unloaded.insert(Self::handler_position(id));
    }

    /// Make consumer `id` unresolvable.
    pub fn forget(&mut self, id: u32) {
        self.positions.remove(&ConsumerId(id));
    }

    /// Let redstone block consumer `id` (when its settings care).
    pub fn block_redstone(&mut self, id: u32) {
        self.redstone_blocked.insert(Self::connector_position(id));
    }

    /// Clear a redstone block set with [`block_redstone`](Self::block_redstone).
    pub fn unblock_redstone(&mut self, id: u32) {
        self.redstone_blocked.remove(&Self::connector_position(id));
    }

    /// Colour signals currently active on the network.
    pub fn set_active_colors(&mut self, mask: u32) {
        self.active_colors = mask;
    }

    /// Limit the operation budget; `None` is unlimited.
    pub fn set_budget(&mut self, budget: Option<u64>) {
        self.budget = budget;
    }

    /// Unload consumer `id`'s handler block as a side effect of the next
    /// successful operation-cost charge.
    pub fn unload_on_charge(&mut self, id: u32) {
        self.unload_on_charge = Some(Self::handler_position(id));
    }

    /// Total operation cost charged so far.
    pub fn charged(&self) -> u64 {
        self.charged
    }

    /// The handler of consumer `id`.
    pub fn handler_of(&self, id: u32) -> Option<&dyn ResourceHandler> {
        self.handlers
            .get(&Self::handler_position(id))
            .map(|h| &**h)
    }

    /// Amount of `resource` held by consumer `id`'s handler.
    pub fn quantity(&self, id: u32, resource: ResourceType) -> i64 {
        let filter = ResourceStack::new(resource, 1);
        self.handler_of(id)
            .map_or(0, |h| h.quantity(None, Some(&filter)))
    }

    /// Number of `handler()` calls made through the context trait.
    pub fn handler_lookups(&self) -> usize {
        self.handler_lookups.get()
    }

    /// Number of direct-connector enumerations (one per cache build).
    pub fn enumerations(&self) -> usize {
        self.enumerations.get()
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerContext for MockController {
    fn resolve_position(&self, consumer: ConsumerId) -> Option<Position> {
        self.positions.get(&consumer).copied()
    }

    fn is_loaded(&self, position: Position) -> bool {
        !self.unloaded.contains(&position)
    }

    fn handler(&self, position: Position, _facing: Option<Side>) -> Option<&dyn ResourceHandler> {
        self.handler_lookups.set(self.handler_lookups.get() + 1);
        self.handlers.get(&position).map(|h| &**h)
    }

    fn matches_color(&self, mask: u32) -> bool {
        self.active_colors & mask == mask
    }

    fn redstone_blocks(&self, position: Position, settings: &EndpointSettings) -> bool {
        settings.redstone != RedstoneMode::Ignored && self.redstone_blocked.contains(&position)
    }

    fn check_and_consume_operation_cost(&mut self, cost: u64) -> bool {
        match self.budget {
            None => {}
            Some(left) if left >= cost => self.budget = Some(left - cost),
            Some(_) => return false,
        }
        self.charged += cost;
        if let Some(position) = self.unload_on_charge.take() {
            self.unloaded.insert(position);
        }
        true
    }

    fn direct_connectors(&self, channel: ChannelId) -> ConnectorMap {
        self.enumerations.set(self.enumerations.get() + 1);
        self.direct.get(&channel).cloned().unwrap_or_default()
    }

    fn routed_connectors(&self, channel: ChannelId) -> ConnectorMap {
        self.routed.get(&channel).cloned().unwrap_or_default()
    }
}
