//! What a channel tick did.
//!
//! [`TickReport`] is returned by every successful
//! [`Channel::tick`](crate::Channel::tick). Handler side effects are the
//! real output of a tick; the report exists so that callers and tests can
//! see them without re-querying every handler.

use sluice_core::{EndpointRef, ResourceType};

/// Why a tick stopped before visiting every source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// A source's redstone condition was not met.
    Redstone {
        /// The gated source.
        source: EndpointRef,
    },
    /// A source's colour mask was not active on the network.
    Color {
        /// The gated source.
        source: EndpointRef,
    },
}

/// Resources inserted into one sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// The receiving sink.
    pub sink: EndpointRef,
    /// Amount inserted.
    pub amount: i64,
}

/// One committed source operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    /// The source extracted from.
    pub source: EndpointRef,
    /// Type moved.
    pub resource: ResourceType,
    /// Amount actually extracted.
    pub extracted: i64,
    /// Per-sink inserts, in commit order.
    pub deliveries: Vec<Delivery>,
    /// Extracted amount that no sink took on commit.
    pub stranded: i64,
}

impl TransferRecord {
    /// Sum of all deliveries.
    pub fn delivered(&self) -> i64 {
        self.deliveries.iter().map(|d| d.amount).sum()
    }
}

/// Result of one [`Channel::tick`](crate::Channel::tick).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sub-tick index `d` when this tick was active, `None` otherwise.
    pub sub_tick: Option<u32>,
    /// Committed transfers, in source order.
    pub transfers: Vec<TransferRecord>,
    /// Set when a source-level gate ended the tick early.
    pub aborted: Option<AbortReason>,
    /// Transfers that were ready but denied by the operation budget.
    pub cost_denied: u32,
}

impl TickReport {
    /// `true` if the channel did work this tick.
    pub fn is_active(&self) -> bool {
        self.sub_tick.is_some()
    }

    /// Total amount inserted into sinks this tick.
    pub fn total_moved(&self) -> i64 {
        self.transfers.iter().map(TransferRecord::delivered).sum()
    }
}
