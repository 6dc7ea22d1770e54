//! Background cycle thread runtime.
//!
//! Responsibilities:
//! - Draw a random hold time for the current phase.
//! - Poll the monotonic clock until the hold time has elapsed.
//! - Flip the shared phase and publish it on the phase channel.
//! - Exit once the shutdown flag is raised.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use minstant::Instant;

use crate::trace::{debug, trace};

use super::interval::IntervalSampler;
use super::phase::AtomicPhase;
use super::PhaseChannel;

/// Where the cycle loop is between two flips.
#[derive(Clone, Copy)]
enum CycleState {
    /// Pick how long the current phase is held.
    ComputeInterval,
    /// Waiting for `interval` to pass since the last flip.
    Sleeping { interval: Duration },
    /// Hold time observed as elapsed at `at`.
    Flip { at: Instant },
}

/// Cycle thread state and event loop.
pub(crate) struct CycleThread {
    phase: Arc<AtomicPhase>,
    channel: Arc<PhaseChannel>,
    sampler: IntervalSampler,
    poll_interval: Duration,
    shutdown_flag: Arc<AtomicBool>,
}

impl CycleThread {
    pub(crate) fn new(
        phase: Arc<AtomicPhase>,
        channel: Arc<PhaseChannel>,
        sampler: IntervalSampler,
        poll_interval: Duration,
        shutdown_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            phase,
            channel,
            sampler,
            poll_interval,
            shutdown_flag,
        }
    }

    /// Runs the cycle loop until the shutdown flag is set.
    pub(crate) fn run(&mut self) {
        let mut last_flip = Instant::now();
        let mut state = CycleState::ComputeInterval;

        while !self.shutdown_flag.load(Ordering::Acquire) {
            state = match state {
                CycleState::ComputeInterval => {
                    let interval = self.sampler.next_interval();
                    trace!(interval_ms = interval.as_millis() as u64, "next flip scheduled");
                    CycleState::Sleeping { interval }
                }
                CycleState::Sleeping { interval } => {
                    let now = Instant::now();
                    if now.duration_since(last_flip) >= interval {
                        CycleState::Flip { at: now }
                    } else {
                        std::thread::sleep(self.poll_interval);
                        CycleState::Sleeping { interval }
                    }
                }
                CycleState::Flip { at } => {
                    // Phase cell first, so a receiver of this value reads it back.
                    let phase = self.phase.toggle();
                    self.channel.send(phase);
                    debug!(
                        %phase,
                        held_ms = at.duration_since(last_flip).as_millis() as u64,
                        "phase flipped"
                    );
                    last_flip = at;
                    CycleState::ComputeInterval
                }
            };
        }
    }
}
