//! Transfer protocol: simulate, then commit.
//!
//! Extraction and distribution are each run twice. The simulate pass
//! searches for an amount that the source can give and the sinks can take
//! in full; only then is anything executed. The commit pass replays the
//! same sink order with real inserts.

use log::{error, trace};
use smallvec::SmallVec;
use sluice_core::{
    resolve_endpoint, Action, ControllerContext, EndpointSettings, ResourceHandler,
    ResourceStack, TransferError,
};

use crate::config::ChannelMode;
use crate::directory::{strictly_above, Endpoint};
use crate::priority::is_preempted;
use crate::round_robin::RoundRobin;

/// A sink that accepted part of a simulated distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Accepted {
    /// Index into the sink list.
    pub sink: usize,
    /// Amount the sink reported it would absorb.
    pub amount: i64,
}

/// Outcome of [`distribute_simulate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Accepting sinks in visiting order.
    pub accepted: SmallVec<[Accepted; 4]>,
    /// Amount no sink would take.
    pub remaining: i64,
}

impl Placement {
    /// Total amount the accepting sinks reported they would take.
    pub fn placed(&self) -> i64 {
        self.accepted.iter().map(|a| a.amount).sum()
    }
}

/// An extraction that passed the simulate loop and is ready to commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionPlan {
    /// Amount to extract for real; the sinks in `placement` take all of it.
    pub amount: i64,
    /// Where it goes.
    pub placement: Placement,
}

/// Outcome of [`distribute_commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// `(sink index, amount inserted)` per sink that took something.
    pub delivered: SmallVec<[(usize, i64); 4]>,
    /// Amount that was extracted but could not be inserted anywhere.
    pub remaining: i64,
}

/// Parameters shared by every distribution attempt within one sub-tick.
pub struct Distribution<'a, C: ?Sized> {
    /// Sinks, highest priority first.
    pub sinks: &'a [Endpoint],
    /// Channel policy.
    pub mode: ChannelMode,
    /// Environment.
    pub ctx: &'a C,
}

impl<C: ?Sized> Clone for Distribution<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for Distribution<'_, C> {}

/// How much a source may give this operation: its rate, reduced so that
/// the handler does not drop below the source's threshold.
///
/// `None` when the threshold is already reached.
pub fn extractable(handler: &dyn ResourceHandler, settings: &EndpointSettings) -> Option<i64> {
    let Some(floor) = settings.threshold else {
        return Some(settings.rate);
    };
    let held = handler.quantity(settings.facing, settings.matcher.as_ref());
    let available = held - floor;
    (available > 0).then(|| settings.rate.min(available))
}

/// How much a sink may take of `offered`: bounded by its rate and by the
/// headroom under its threshold.
///
/// `None` when the sink is at or above its threshold.
pub fn insertable(
    handler: &dyn ResourceHandler,
    settings: &EndpointSettings,
    offered: i64,
) -> Option<i64> {
    let to_insert = settings.rate.min(offered);
    let Some(ceiling) = settings.threshold else {
        return Some(to_insert);
    };
    let held = handler.quantity(settings.facing, settings.matcher.as_ref());
    let headroom = ceiling - held;
    (headroom > 0).then(|| to_insert.min(headroom))
}

fn absorbed(offered: i64, leftover: &ResourceStack) -> i64 {
    if leftover.is_empty() {
        offered
    } else {
        offered - leftover.amount
    }
}

/// Dry-run distribution of `stack` over the sinks, starting at the
/// round-robin offset and wrapping once.
///
/// Sinks that fail their filter, are unresolvable or unloaded, are gated,
/// are at their threshold, or (in priority mode) are preempted, are
/// skipped. Stops as soon as everything is placed.
pub fn distribute_simulate<C>(
    stack: &ResourceStack,
    dist: Distribution<'_, C>,
    round_robin: &RoundRobin,
) -> Placement
where
    C: ControllerContext + ?Sized,
{
    let mut amount = stack.amount;
    let mut accepted = SmallVec::new();

    for index in round_robin.order(dist.sinks.len()) {
        let sink = &dist.sinks[index];
        let settings = &sink.settings;
        if !settings.accepts(stack) {
            continue;
        }
        let Some((connector, handler)) = resolve_endpoint(dist.ctx, &sink.key, settings) else {
            trace!("sink {}: unresolved or unloaded", sink.key);
            continue;
        };
        if dist.ctx.redstone_blocks(connector, settings) {
            trace!("sink {}: blocked by redstone", sink.key);
            continue;
        }
        if !dist.ctx.matches_color(settings.color_mask) {
            trace!("sink {}: colour mask not active", sink.key);
            continue;
        }
        let Some(to_insert) = insertable(handler, settings, amount) else {
            continue;
        };
        if dist.mode == ChannelMode::Priority {
            let higher = strictly_above(dist.sinks, sink.priority());
            if is_preempted(sink, handler, higher, dist.ctx) {
                trace!("sink {}: preempted", sink.key);
                continue;
            }
        }

        let offer = stack.with_amount(to_insert);
        let leftover = handler.insert(&offer, settings.facing, Action::Simulate);
        let taken = absorbed(to_insert, &leftover);
        if taken > 0 {
            accepted.push(Accepted {
                sink: index,
                amount: taken,
            });
            amount -= taken;
            if amount <= 0 {
                return Placement {
                    accepted,
                    remaining: 0,
                };
            }
        }
    }

    Placement {
        accepted,
        remaining: amount,
    }
}

/// Insert `stack` for real into the sinks recorded by a simulate pass.
///
/// Sink amounts are re-derived against live state in the recorded order.
/// Every sink that takes a nonzero amount advances `round_robin` by one.
pub fn distribute_commit<C>(
    stack: &ResourceStack,
    dist: Distribution<'_, C>,
    placement: &Placement,
    round_robin: &mut RoundRobin,
) -> Commit
where
    C: ControllerContext + ?Sized,
{
    let mut amount = stack.amount;
    let mut delivered = SmallVec::new();

    for accepted in &placement.accepted {
        let Some(sink) = dist.sinks.get(accepted.sink) else {
            continue;
        };
        let settings = &sink.settings;
        let Some((_, handler)) = resolve_endpoint(dist.ctx, &sink.key, settings) else {
            continue;
        };
        let Some(to_insert) = insertable(handler, settings, amount) else {
            continue;
        };

        let offer = stack.with_amount(to_insert);
        let leftover = handler.insert(&offer, settings.facing, Action::Execute);
        let taken = absorbed(to_insert, &leftover);
        if taken > 0 {
            round_robin.advance(dist.sinks.len());
            delivered.push((accepted.sink, taken));
            amount -= taken;
            if amount <= 0 {
                break;
            }
        }
    }

    Commit {
        delivered,
        remaining: amount.max(0),
    }
}

/// Search for an amount the source can give and the sinks can absorb in full.
///
/// Starts from `to_extract` and shrinks it to what the sinks accepted until
/// a simulated distribution places everything. Gives up when the source
/// yields nothing (or the wrong type) or when no sink accepts anything.
pub fn plan_extraction<C>(
    handler: &dyn ResourceHandler,
    source: &EndpointSettings,
    mut to_extract: i64,
    dist: Distribution<'_, C>,
    round_robin: &RoundRobin,
) -> Option<ExtractionPlan>
where
    C: ControllerContext + ?Sized,
{
    loop {
        let stack = handler.extract(to_extract, source.facing, Action::Simulate);
        if stack.is_empty() || !source.accepts(&stack) {
            return None;
        }
        to_extract = to_extract.min(stack.amount);
        let stack = stack.with_amount(to_extract);

        let placement = distribute_simulate(&stack, dist, round_robin);
        to_extract -= placement.remaining;
        if placement.accepted.is_empty() || to_extract <= 0 {
            return None;
        }
        if placement.remaining <= 0 {
            return Some(ExtractionPlan {
                amount: to_extract,
                placement,
            });
        }
    }
}

/// Execute the extraction a plan settled on.
///
/// A handler that returns nothing here, after the simulate pass returned
/// something for the same amount, has broken its contract; that is fatal.
pub fn commit_extraction(
    handler: &dyn ResourceHandler,
    source: &EndpointSettings,
    amount: i64,
) -> Result<ResourceStack, TransferError> {
    let stack = handler.extract(amount, source.facing, Action::Execute);
    if stack.is_empty() {
        error!(
            "{} misbehaved: extract({amount}) returned nothing on execute after a successful simulate",
            handler.name()
        );
        return Err(TransferError::ContractViolation {
            handler: handler.name().to_string(),
            requested: amount,
        });
    }
    Ok(stack)
}
