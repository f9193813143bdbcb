//! Endpoint directory: the per-channel cache of sources and sinks.
//!
//! [`EndpointCache`] is built in one go from the controller's connector
//! maps and is never patched. When the topology changes the owning
//! [`Channel`](crate::Channel) drops it and the next active tick builds a
//! fresh one.

use log::debug;
use sluice_core::{
    ChannelId, ConnectorMap, ControllerContext, EndpointRef, EndpointRole, EndpointSettings,
};

/// A connector face together with its settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// Which connector face.
    pub key: EndpointRef,
    /// How it is configured.
    pub settings: EndpointSettings,
}

impl Endpoint {
    /// Pair a connector face with its settings.
    pub fn new(key: EndpointRef, settings: EndpointSettings) -> Self {
        Self { key, settings }
    }

    /// Shorthand for `settings.priority`.
    pub fn priority(&self) -> i32 {
        self.settings.priority
    }
}

/// Classified endpoints of one channel.
///
/// `sources` keep enumeration order. `sinks` are sorted by descending
/// priority; equal priorities keep enumeration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointCache {
    sources: Vec<Endpoint>,
    sinks: Vec<Endpoint>,
}

impl EndpointCache {
    /// Enumerate and classify the connectors of `channel`.
    pub fn build<C>(channel: ChannelId, ctx: &C) -> Self
    where
        C: ControllerContext + ?Sized,
    {
        let cache = Self::from_connectors(
            ctx.direct_connectors(channel),
            ctx.routed_connectors(channel),
        );
        debug!(
            "channel {channel}: endpoint cache rebuilt ({} sources, {} sinks)",
            cache.sources.len(),
            cache.sinks.len()
        );
        cache
    }

    /// Classify already-enumerated connectors.
    ///
    /// Direct connectors become sources or sinks by role. Routed
    /// connectors only ever contribute sinks.
    pub fn from_connectors(direct: ConnectorMap, routed: ConnectorMap) -> Self {
        let mut sources = Vec::new();
        let mut sinks = Vec::new();

        for (key, settings) in direct {
            match settings.role {
                EndpointRole::Source => sources.push(Endpoint::new(key, settings)),
                EndpointRole::Sink => sinks.push(Endpoint::new(key, settings)),
            }
        }
        sinks.extend(
            routed
                .into_iter()
                .filter(|(_, settings)| settings.role == EndpointRole::Sink)
                .map(|(key, settings)| Endpoint::new(key, settings)),
        );

        // `sort_by` is stable: equal priorities stay in enumeration order.
        sinks.sort_by(|a, b| b.priority().cmp(&a.priority()));

        Self { sources, sinks }
    }

    /// Sources, in enumeration order.
    pub fn sources(&self) -> &[Endpoint] {
        &self.sources
    }

    /// Sinks, highest priority first.
    pub fn sinks(&self) -> &[Endpoint] {
        &self.sinks
    }

    /// `true` when the channel has neither sources nor sinks.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.sinks.is_empty()
    }
}

/// The prefix of a priority-sorted endpoint list whose priority is
/// strictly above `priority`.
pub(crate) fn strictly_above(sorted: &[Endpoint], priority: i32) -> &[Endpoint] {
    &sorted[..sorted.partition_point(|e| e.priority() > priority)]
}
