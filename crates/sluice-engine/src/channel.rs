//! Channel scheduler: the tick driver.
//!
//! A [`Channel`] is ticked once per controller tick. It counts a delay
//! timer down through a 1200-tick macro-cycle and does work on every tenth
//! tick. On those sub-ticks it visits its sources in cache order and, for
//! each eligible one, runs the simulate/commit transfer protocol against
//! its sinks.
//!
//! # Gating
//!
//! A source whose redstone condition or colour mask fails ends the whole
//! tick, not just that source. Sink-level gates only skip the sink.

use log::{debug, trace, warn};
use sluice_core::{resolve_endpoint, ChannelId, ControllerContext, TransferError};

use crate::codec::ChannelState;
use crate::config::{
    ChannelConfig, ChannelMode, ConfigError, ModeChoice, SchedulerConfig, MACRO_CYCLE,
    SUBTICK_PERIOD, TAG_MODE,
};
use crate::directory::EndpointCache;
use crate::priority::is_preempted;
use crate::report::{AbortReason, Delivery, TickReport, TransferRecord};
use crate::round_robin::RoundRobin;
use crate::transfer::{
    commit_extraction, distribute_commit, extractable, plan_extraction, Distribution,
};

/// Scheduling state of one channel.
#[derive(Clone, Debug, Default)]
pub struct Channel {
    mode: ChannelMode,
    delay: i32,
    round_robin: RoundRobin,
    cache: Option<EndpointCache>,
    config: SchedulerConfig,
}

impl Channel {
    /// A fresh channel: distribute mode, timer and offset at zero, no cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh channel with non-default scheduler tunables.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current distribution policy.
    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Change the distribution policy.
    pub fn set_mode(&mut self, mode: ChannelMode) {
        self.mode = mode;
    }

    /// Current value of the delay counter.
    pub fn delay(&self) -> i32 {
        self.delay
    }

    /// Current round-robin offset.
    pub fn offset(&self) -> usize {
        self.round_robin.offset()
    }

    /// The endpoint cache, if built.
    pub fn cache(&self) -> Option<&EndpointCache> {
        self.cache.as_ref()
    }

    /// Drop the endpoint cache. Call whenever connectors on this channel
    /// are added, removed or reconfigured.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    /// Run one controller tick.
    ///
    /// Returns a report of what moved. The only error is a handler contract
    /// violation, which aborts the tick immediately. Transfers committed
    /// earlier in the same tick stay committed and the round-robin offset
    /// keeps the advances they made, but their records are discarded with
    /// the report: after an error, handler contents are the only account of
    /// what moved.
    pub fn tick<C>(&mut self, channel: ChannelId, ctx: &mut C) -> Result<TickReport, TransferError>
    where
        C: ControllerContext + ?Sized,
    {
        self.delay -= 1;
        if self.delay <= 0 {
            self.delay = MACRO_CYCLE;
        }

        let mut report = TickReport::default();
        if self.delay % SUBTICK_PERIOD != 0 {
            return Ok(report);
        }
        let d = (self.delay / SUBTICK_PERIOD) as u32;
        report.sub_tick = Some(d);

        if self.cache.is_none() {
            let built = EndpointCache::build(channel, &*ctx);
            self.round_robin.normalize(built.sinks().len());
            self.cache = Some(built);
        }
        let Some(cache) = self.cache.as_ref() else {
            return Ok(report);
        };

        for source in cache.sources() {
            let settings = &source.settings;
            if d % settings.speed.max(1) != 0 {
                continue;
            }

            let dist = Distribution {
                sinks: cache.sinks(),
                mode: self.mode,
                ctx: &*ctx,
            };
            let Some((connector, handler)) = resolve_endpoint(&*ctx, &source.key, settings) else {
                trace!("channel {channel}: source {} unresolved or unloaded", source.key);
                continue;
            };
            if ctx.redstone_blocks(connector, settings) {
                debug!("channel {channel}: source {} blocked by redstone, tick ends", source.key);
                report.aborted = Some(AbortReason::Redstone { source: source.key });
                return Ok(report);
            }
            if !ctx.matches_color(settings.color_mask) {
                debug!("channel {channel}: source {} colour mask inactive, tick ends", source.key);
                report.aborted = Some(AbortReason::Color { source: source.key });
                return Ok(report);
            }

            let Some(to_extract) = extractable(handler, settings) else {
                trace!("channel {channel}: source {} at threshold", source.key);
                continue;
            };
            if self.mode == ChannelMode::Priority
                && is_preempted(source, handler, cache.sources(), &*ctx)
            {
                trace!("channel {channel}: source {} preempted", source.key);
                continue;
            }
            let Some(plan) = plan_extraction(handler, settings, to_extract, dist, &self.round_robin)
            else {
                continue;
            };

            if !ctx.check_and_consume_operation_cost(self.config.operation_cost) {
                trace!("channel {channel}: operation budget exhausted");
                report.cost_denied += 1;
                continue;
            }

            // The budget call needed the context mutably; look the handler up again.
            let dist = Distribution {
                sinks: cache.sinks(),
                mode: self.mode,
                ctx: &*ctx,
            };
            let Some((_, handler)) = resolve_endpoint(&*ctx, &source.key, settings) else {
                warn!(
                    "channel {channel}: source {} vanished after operation cost was charged",
                    source.key
                );
                continue;
            };
            let extracted = commit_extraction(handler, settings, plan.amount)?;
            let commit = distribute_commit(&extracted, dist, &plan.placement, &mut self.round_robin);

            if commit.remaining > 0 {
                warn!(
                    "channel {channel}: {} of {} from source {} stranded, sinks refused on commit",
                    commit.remaining, extracted.resource, source.key
                );
            }
            debug!(
                "channel {channel}: moved {} from source {} to {} sink(s)",
                extracted,
                source.key,
                commit.delivered.len()
            );
            report.transfers.push(TransferRecord {
                source: source.key,
                resource: extracted.resource,
                extracted: extracted.amount,
                deliveries: commit
                    .delivered
                    .iter()
                    .map(|&(index, amount)| Delivery {
                        sink: cache.sinks()[index].key,
                        amount,
                    })
                    .collect(),
                stranded: commit.remaining,
            });
        }

        Ok(report)
    }

    // ── Persistence and editor hooks ───────────────────────────────

    /// The persisted fields.
    pub fn state(&self) -> ChannelState {
        ChannelState {
            mode: self.mode,
            delay: self.delay,
            offset: i32::try_from(self.round_robin.offset()).unwrap_or(i32::MAX),
        }
    }

    /// Restore persisted fields. The cache is left untouched.
    ///
    /// The delay is clamped into `[0, MACRO_CYCLE]`; a negative offset is
    /// treated as zero.
    pub fn restore(&mut self, state: ChannelState) {
        self.mode = state.mode;
        self.delay = state.delay.clamp(0, MACRO_CYCLE);
        self.round_robin = RoundRobin::new(usize::try_from(state.offset).unwrap_or(0));
        if let Some(cache) = &self.cache {
            self.round_robin.normalize(cache.sinks().len());
        }
    }

    /// The lightweight config form.
    pub fn config(&self) -> ChannelConfig {
        ChannelConfig { mode: self.mode }
    }

    /// Apply the lightweight config form.
    pub fn apply_config(&mut self, config: &ChannelConfig) {
        self.mode = config.mode;
    }

    /// Describe the editable option for a settings editor.
    pub fn describe(&self) -> ModeChoice {
        ModeChoice::new(self.mode)
    }

    /// Apply an editor change. Mode names are matched case-insensitively.
    pub fn apply_update(&mut self, tag: &str, value: &str) -> Result<(), ConfigError> {
        if tag != TAG_MODE {
            return Err(ConfigError::UnknownTag {
                tag: tag.to_string(),
            });
        }
        let mode = ChannelMode::from_name(&value.to_ascii_uppercase()).ok_or_else(|| {
            ConfigError::UnknownMode {
                name: value.to_string(),
            }
        })?;
        self.mode = mode;
        Ok(())
    }

    /// Whether an editor option is currently enabled. Every option is.
    pub fn is_enabled(&self, _tag: &str) -> bool {
        true
    }

    /// Short status text for a network overview. Channels show none.
    pub fn indicator(&self) -> Option<&str> {
        None
    }

    /// Colour signals this channel emits. Channels emit none.
    pub fn colors(&self) -> u32 {
        0
    }
}
