//! A two-phase traffic signal for thread-based simulations.
//!
//! [`SignalController`] owns a background cycle thread that holds each
//! [`Phase`] for a random 4–6 s and publishes every flip on a
//! latest-value-wins [`PhaseChannel`]. Vehicle threads call
//! [`SignalController::wait_for_go`] to block until the light turns green.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::thread;
//!
//! use stoplight::{Phase, SignalController};
//!
//! let signal = Arc::new(SignalController::new());
//! signal.start()?;
//!
//! let waiter = Arc::clone(&signal);
//! let vehicle = thread::spawn(move || waiter.wait_for_go());
//!
//! vehicle.join().expect("vehicle thread panicked")?;
//! assert_eq!(signal.current_phase(), Phase::Go);
//!
//! signal.shutdown();
//! # Ok::<(), stoplight::SignalError>(())
//! ```
//!
//! The channel itself is generic and lives in [`sync::latest`].

pub mod signal;
pub mod sync;
mod trace;

pub use signal::{Phase, PhaseChannel, SignalConfig, SignalController, SignalError};
pub use trace::init_tracing;
