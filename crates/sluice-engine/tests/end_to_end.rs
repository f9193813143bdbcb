//! End-to-end channel scenarios against the mock controller.
//!
//! Each test wires a small topology, runs one or two active sub-ticks, and
//! checks handler contents plus the returned [`TickReport`].

use sluice_core::{ChannelId, EndpointSettings, RedstoneMode, ResourceType, TransferError};
use sluice_engine::{AbortReason, Channel, ChannelMode, SchedulerConfig, TickReport};
use sluice_test_utils::{MockController, MockHandler};

const CH: ChannelId = ChannelId(9);
const GAS_A: ResourceType = ResourceType(1);
const GAS_B: ResourceType = ResourceType(2);

fn tick_active(channel: &mut Channel, ctx: &mut MockController) -> TickReport {
    loop {
        let report = channel.tick(CH, ctx).unwrap();
        if report.is_active() {
            return report;
        }
    }
}

fn source(rate: i64) -> EndpointSettings {
    EndpointSettings::source().rate(rate).build().unwrap()
}

fn sink(rate: i64) -> EndpointSettings {
    EndpointSettings::sink().rate(rate).build().unwrap()
}

#[test]
fn single_sink_moves_its_rate() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    let dst = ctx.connect(
        CH,
        2,
        EndpointSettings::sink().rate(40).matcher(GAS_A).build().unwrap(),
        MockHandler::new("dst"),
    );

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.total_moved(), 40);
    assert_eq!(report.transfers.len(), 1);
    assert_eq!(report.transfers[0].deliveries[0].sink, dst);
    assert_eq!(ctx.quantity(1, GAS_A), 960);
    assert_eq!(ctx.quantity(2, GAS_A), 40);
    assert_eq!(channel.offset(), 0);
}

#[test]
fn higher_priority_source_preempts_overlapping_one() {
    let mut ctx = MockController::new();
    let x = ctx.connect(
        CH,
        1,
        EndpointSettings::source().rate(100).priority(5).build().unwrap(),
        MockHandler::new("x").holding(GAS_A, 1000),
    );
    ctx.connect(
        CH,
        2,
        EndpointSettings::source().rate(100).priority(1).build().unwrap(),
        MockHandler::new("y").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    channel.set_mode(ChannelMode::Priority);
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 1);
    assert_eq!(report.transfers[0].source, x);
    assert_eq!(ctx.quantity(1, GAS_A), 900);
    assert_eq!(ctx.quantity(2, GAS_A), 1000);
    assert_eq!(ctx.quantity(3, GAS_A), 100);
}

#[test]
fn distribute_mode_ignores_priority_between_sources() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        EndpointSettings::source().rate(100).priority(5).build().unwrap(),
        MockHandler::new("x").holding(GAS_A, 1000),
    );
    ctx.connect(
        CH,
        2,
        EndpointSettings::source().rate(100).priority(1).build().unwrap(),
        MockHandler::new("y").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 2);
    assert_eq!(ctx.quantity(3, GAS_A), 200);
}

#[test]
fn disjoint_contents_do_not_preempt() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        EndpointSettings::source().rate(10).priority(5).build().unwrap(),
        MockHandler::new("x").holding(GAS_A, 100),
    );
    ctx.connect(
        CH,
        2,
        EndpointSettings::source().rate(10).priority(1).build().unwrap(),
        MockHandler::new("y").holding(GAS_B, 100),
    );
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    channel.set_mode(ChannelMode::Priority);
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 2);
    assert_eq!(ctx.quantity(3, GAS_A), 10);
    assert_eq!(ctx.quantity(3, GAS_B), 10);
}

#[test]
fn sink_threshold_caps_insert() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(
        CH,
        2,
        EndpointSettings::sink()
            .rate(1000)
            .matcher(GAS_A)
            .threshold(50)
            .build()
            .unwrap(),
        MockHandler::new("dst").holding(GAS_A, 45),
    );

    let mut channel = Channel::new();
    let first = tick_active(&mut channel, &mut ctx);
    assert_eq!(first.total_moved(), 5);
    assert_eq!(ctx.quantity(2, GAS_A), 50);
    assert_eq!(ctx.quantity(1, GAS_A), 995);

    let second = tick_active(&mut channel, &mut ctx);
    assert_eq!(second.total_moved(), 0);
    assert!(second.transfers.is_empty());
    assert_eq!(ctx.quantity(1, GAS_A), 995);
}

#[test]
fn source_threshold_keeps_a_floor() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        EndpointSettings::source().rate(100).threshold(950).build().unwrap(),
        MockHandler::new("tank").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 2, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    assert_eq!(tick_active(&mut channel, &mut ctx).total_moved(), 50);
    assert_eq!(tick_active(&mut channel, &mut ctx).total_moved(), 0);
    assert_eq!(ctx.quantity(1, GAS_A), 950);
}

#[test]
fn source_redstone_gate_ends_the_tick() {
    let mut ctx = MockController::new();
    let gated = ctx.connect(
        CH,
        1,
        EndpointSettings::source()
            .rate(100)
            .redstone(RedstoneMode::On)
            .build()
            .unwrap(),
        MockHandler::new("gated").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 2, source(100), MockHandler::new("open").holding(GAS_A, 1000));
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));
    ctx.block_redstone(1);

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.aborted, Some(AbortReason::Redstone { source: gated }));
    assert!(report.transfers.is_empty());
    assert_eq!(ctx.quantity(2, GAS_A), 1000);

    ctx.unblock_redstone(1);
    let report = tick_active(&mut channel, &mut ctx);
    assert!(report.aborted.is_none());
    assert_eq!(report.transfers.len(), 2);
}

#[test]
fn source_colour_gate_ends_the_tick() {
    let mut ctx = MockController::new();
    let gated = ctx.connect(
        CH,
        1,
        EndpointSettings::source().color_mask(0b10).build().unwrap(),
        MockHandler::new("gated").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 2, source(100), MockHandler::new("open").holding(GAS_A, 1000));
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);
    assert_eq!(report.aborted, Some(AbortReason::Color { source: gated }));
    assert_eq!(report.total_moved(), 0);

    ctx.set_active_colors(0b11);
    let report = tick_active(&mut channel, &mut ctx);
    assert_eq!(report.transfers.len(), 2);
}

#[test]
fn gated_sink_is_skipped_not_fatal() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(
        CH,
        2,
        EndpointSettings::sink()
            .priority(3)
            .redstone(RedstoneMode::Off)
            .build()
            .unwrap(),
        MockHandler::new("gated"),
    );
    ctx.connect(CH, 3, sink(1000), MockHandler::new("open"));
    ctx.block_redstone(2);

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert!(report.aborted.is_none());
    assert_eq!(ctx.quantity(2, GAS_A), 0);
    assert_eq!(ctx.quantity(3, GAS_A), 100);
}

#[test]
fn unloaded_endpoints_are_skipped() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("far").holding(GAS_A, 1000));
    ctx.connect(CH, 2, source(100), MockHandler::new("near").holding(GAS_A, 1000));
    ctx.connect(CH, 3, sink(1000), MockHandler::new("unloaded"));
    ctx.connect(CH, 4, sink(1000), MockHandler::new("loaded"));
    ctx.unload(1);
    ctx.unload(3);

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 1);
    assert_eq!(ctx.quantity(1, GAS_A), 1000);
    assert_eq!(ctx.quantity(2, GAS_A), 900);
    assert_eq!(ctx.quantity(4, GAS_A), 100);
}

#[test]
fn budget_denial_changes_nothing() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(CH, 2, sink(40), MockHandler::new("a"));
    ctx.connect(CH, 3, sink(40), MockHandler::new("b"));
    ctx.set_budget(Some(50));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.cost_denied, 1);
    assert!(report.transfers.is_empty());
    assert_eq!(ctx.quantity(1, GAS_A), 1000);
    assert_eq!(channel.offset(), 0);
    assert_eq!(ctx.charged(), 0);
}

#[test]
fn custom_operation_cost_is_charged_per_transfer() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(10), MockHandler::new("a").holding(GAS_A, 1000));
    ctx.connect(CH, 2, source(10), MockHandler::new("b").holding(GAS_A, 1000));
    ctx.connect(CH, 3, sink(1000), MockHandler::new("dst"));
    ctx.set_budget(Some(30));

    let mut channel = Channel::with_config(SchedulerConfig { operation_cost: 25 });
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 1);
    assert_eq!(report.cost_denied, 1);
    assert_eq!(ctx.charged(), 25);
}

#[test]
fn contract_violation_is_reported() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        source(100),
        MockHandler::new("liar").holding(GAS_A, 1000).refusing_execute(),
    );
    ctx.connect(CH, 2, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    // The first tick after construction is always an active sub-tick.
    let err = channel.tick(CH, &mut ctx).unwrap_err();

    assert_eq!(
        err,
        TransferError::ContractViolation {
            handler: "liar".to_string(),
            requested: 100,
        }
    );
    assert!(err.to_string().contains("liar"));
    assert_eq!(ctx.quantity(2, GAS_A), 0);
}

#[test]
fn sink_refusing_commit_strands_the_extract() {
    let mut ctx = MockController::new();
    let src = ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(CH, 2, sink(1000), MockHandler::new("flaky").refusing_execute());

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    let record = &report.transfers[0];
    assert_eq!(record.source, src);
    assert_eq!(record.extracted, 100);
    assert_eq!(record.stranded, 100);
    assert!(record.deliveries.is_empty());
    assert_eq!(ctx.quantity(1, GAS_A), 900);
    assert_eq!(channel.offset(), 0);
}

#[test]
fn offset_counts_sinks_that_took_before_a_later_refusal() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    let taker = ctx.connect(CH, 2, sink(50), MockHandler::new("taker"));
    ctx.connect(CH, 3, sink(50), MockHandler::new("flaky").refusing_execute());
    ctx.connect(CH, 4, sink(50), MockHandler::new("full").capacity(0));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    let record = &report.transfers[0];
    assert_eq!(record.extracted, 100);
    assert_eq!(record.deliveries.len(), 1);
    assert_eq!(record.deliveries[0].sink, taker);
    assert_eq!(record.deliveries[0].amount, 50);
    assert_eq!(record.stranded, 50);
    assert_eq!(channel.offset(), 1);
    assert_eq!(ctx.quantity(2, GAS_A), 50);
    assert_eq!(ctx.quantity(3, GAS_A), 0);
}

#[test]
fn charged_source_that_disappears_moves_nothing() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(CH, 2, sink(1000), MockHandler::new("dst"));
    ctx.unload_on_charge(1);

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert!(report.transfers.is_empty());
    assert_eq!(report.cost_denied, 0);
    assert_eq!(ctx.charged(), 100);
    assert_eq!(ctx.quantity(1, GAS_A), 1000);
    assert_eq!(ctx.quantity(2, GAS_A), 0);
    assert_eq!(channel.offset(), 0);
}

#[test]
fn contract_violation_keeps_earlier_commits_of_the_tick() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(50), MockHandler::new("honest").holding(GAS_A, 1000));
    ctx.connect(
        CH,
        2,
        source(50),
        MockHandler::new("liar").holding(GAS_A, 1000).refusing_execute(),
    );
    ctx.connect(CH, 3, sink(100), MockHandler::new("a"));
    ctx.connect(CH, 4, sink(100), MockHandler::new("b"));

    let mut channel = Channel::new();
    let err = channel.tick(CH, &mut ctx).unwrap_err();

    assert!(matches!(err, TransferError::ContractViolation { requested: 50, .. }));
    // The honest source's transfer stays committed and keeps its offset advance.
    assert_eq!(ctx.quantity(1, GAS_A), 950);
    assert_eq!(ctx.quantity(3, GAS_A), 50);
    assert_eq!(ctx.quantity(4, GAS_A), 0);
    assert_eq!(channel.offset(), 1);
}

#[test]
fn routed_connectors_only_contribute_sinks() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect_routed(CH, 2, sink(1000), MockHandler::new("remote"));
    ctx.connect_routed(CH, 3, source(100), MockHandler::new("remote-src").holding(GAS_B, 500));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers.len(), 1);
    assert_eq!(ctx.quantity(2, GAS_A), 100);
    assert_eq!(ctx.quantity(3, GAS_B), 500);
    let cache = channel.cache().unwrap();
    assert_eq!(cache.sources().len(), 1);
    assert_eq!(cache.sinks().len(), 1);
}

#[test]
fn matcher_mismatch_moves_nothing() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        EndpointSettings::source().matcher(GAS_B).build().unwrap(),
        MockHandler::new("tank").holding(GAS_A, 1000),
    );
    ctx.connect(
        CH,
        2,
        EndpointSettings::sink().matcher(GAS_B).build().unwrap(),
        MockHandler::new("dst"),
    );

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);
    assert!(report.transfers.is_empty());
    assert_eq!(ctx.quantity(1, GAS_A), 1000);
}

#[test]
fn speed_throttles_a_source() {
    let mut ctx = MockController::new();
    ctx.connect(
        CH,
        1,
        EndpointSettings::source().rate(10).speed(7).build().unwrap(),
        MockHandler::new("slow").holding(GAS_A, 1000),
    );
    ctx.connect(CH, 2, sink(1000), MockHandler::new("dst"));

    let mut channel = Channel::new();
    // Sub-tick 120 is not a multiple of 7; 119 is.
    let first = tick_active(&mut channel, &mut ctx);
    assert_eq!(first.sub_tick, Some(120));
    assert_eq!(first.total_moved(), 0);
    let second = tick_active(&mut channel, &mut ctx);
    assert_eq!(second.sub_tick, Some(119));
    assert_eq!(second.total_moved(), 10);
}

#[test]
fn partial_acceptance_shrinks_the_extract() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(500), MockHandler::new("tank").holding(GAS_A, 1000));
    ctx.connect(CH, 2, sink(1000), MockHandler::new("small").capacity(120));

    let mut channel = Channel::new();
    let report = tick_active(&mut channel, &mut ctx);

    assert_eq!(report.transfers[0].extracted, 120);
    assert_eq!(report.transfers[0].stranded, 0);
    assert_eq!(ctx.quantity(1, GAS_A), 880);
}

#[test]
fn invalidated_cache_picks_up_new_connectors() {
    let mut ctx = MockController::new();
    ctx.connect(CH, 1, source(100), MockHandler::new("tank").holding(GAS_A, 1000));

    let mut channel = Channel::new();
    assert!(tick_active(&mut channel, &mut ctx).transfers.is_empty());

    ctx.connect(CH, 2, sink(1000), MockHandler::new("late"));
    assert!(tick_active(&mut channel, &mut ctx).transfers.is_empty());

    channel.invalidate_cache();
    assert_eq!(tick_active(&mut channel, &mut ctx).total_moved(), 100);
}
