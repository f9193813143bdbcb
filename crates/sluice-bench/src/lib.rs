//! Benchmark profiles and utilities for the Sluice channel scheduler.
//!
//! Provides pre-built channel topologies on a [`MockController`]:
//!
//! - [`reference_profile`]: 8 sources feeding 32 sinks of mixed priority
//! - [`stress_profile`]: 64 sources feeding 512 sinks
//! - [`run_macro_cycle`]: tick a channel through one full macro-cycle
//!
//! Layouts are drawn from a seeded ChaCha stream so runs are reproducible.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sluice_core::{ChannelId, EndpointSettings, ResourceType, TransferError};
use sluice_engine::{Channel, ChannelMode, MACRO_CYCLE};
use sluice_test_utils::{MockController, MockHandler};

/// Channel every profile populates.
pub const BENCH_CHANNEL: ChannelId = ChannelId(0);

/// Number of distinct resource types in the profiles.
pub const RESOURCE_KINDS: u32 = 4;

/// Shape of a generated topology.
#[derive(Clone, Copy, Debug)]
pub struct Profile {
    /// Number of source connectors.
    pub sources: u32,
    /// Number of sink connectors.
    pub sinks: u32,
    /// Amount each source starts with.
    pub stock: i64,
}

/// 8 sources, 32 sinks.
pub fn reference_profile(seed: u64) -> MockController {
    build_profile(
        Profile {
            sources: 8,
            sinks: 32,
            stock: 1_000_000,
        },
        seed,
    )
}

/// 64 sources, 512 sinks.
pub fn stress_profile(seed: u64) -> MockController {
    build_profile(
        Profile {
            sources: 64,
            sinks: 512,
            stock: 1_000_000,
        },
        seed,
    )
}

/// Populate a controller with `profile`.
///
/// Sources hold one resource type each and use speed 1, 2 or 4. Sinks get
/// a priority in `0..4`, a rate in `50..=500`, and half of them a matcher.
pub fn build_profile(profile: Profile, seed: u64) -> MockController {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ctx = MockController::new();

    for id in 0..profile.sources {
        let resource = ResourceType(rng.next_u32() % RESOURCE_KINDS);
        let speed = 1 << (rng.next_u32() % 3);
        let settings = EndpointSettings::source()
            .rate(200)
            .speed(speed)
            .build()
            .expect("bench source settings are valid");
        ctx.connect(
            BENCH_CHANNEL,
            id,
            settings,
            MockHandler::new(format!("source-{id}")).holding(resource, profile.stock),
        );
    }

    for n in 0..profile.sinks {
        let id = profile.sources + n;
        let roll = rng.next_u64();
        let mut builder = EndpointSettings::sink()
            .rate(50 + (roll % 451) as i64)
            .priority(((roll >> 16) % 4) as i32);
        if (roll >> 32) & 1 == 1 {
            builder = builder.matcher(ResourceType(((roll >> 40) % RESOURCE_KINDS as u64) as u32));
        }
        ctx.connect(
            BENCH_CHANNEL,
            id,
            builder.build().expect("bench sink settings are valid"),
            MockHandler::new(format!("sink-{n}")),
        );
    }

    ctx
}

/// Tick `channel` through one macro-cycle. Returns the total amount moved.
pub fn run_macro_cycle(
    channel: &mut Channel,
    ctx: &mut MockController,
) -> Result<i64, TransferError> {
    let mut moved = 0;
    for _ in 0..MACRO_CYCLE {
        moved += channel.tick(BENCH_CHANNEL, ctx)?.total_moved();
    }
    Ok(moved)
}

/// A fresh channel in `mode`.
pub fn channel(mode: ChannelMode) -> Channel {
    let mut c = Channel::new();
    c.set_mode(mode);
    c
}
