//! The traffic signal: a two-phase controller driven by a background cycle
//! thread.
//!
//! - `phase`: the [`Phase`] value type and its atomic cell.
//! - `config`: cycle timing ([`SignalConfig`]).
//! - `interval`: random hold times.
//! - `cycle`: the thread that flips and publishes phases.
//! - `controller`: lifecycle and the blocking [`SignalController::wait_for_go`].

mod config;
mod controller;
mod cycle;
mod error;
mod interval;
mod phase;

pub use config::{
    DEFAULT_MAX_INTERVAL, DEFAULT_MIN_INTERVAL, DEFAULT_POLL_INTERVAL, DEFAULT_THREAD_NAME,
    SignalConfig,
};
pub use controller::SignalController;
pub use error::SignalError;
pub use interval::IntervalSampler;
pub use phase::{AtomicPhase, Phase};

use crate::sync::latest::LatestChannel;

/// Latest-value-wins channel carrying phase flips from the cycle thread to
/// waiters.
pub type PhaseChannel = LatestChannel<Phase>;
