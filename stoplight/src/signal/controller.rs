//! The signal controller: lifecycle handle and blocking waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use minstant::Instant;

use crate::sync::latest::{Closed, RecvTimeoutError};
use crate::trace::{debug, info, warn};

use super::cycle::CycleThread;
use super::interval::IntervalSampler;
use super::phase::AtomicPhase;
use super::{Phase, PhaseChannel, SignalConfig, SignalError};

enum Lifecycle {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

/// A traffic signal that flips between [`Phase::Stop`] and [`Phase::Go`] on
/// a randomized timer.
///
/// The controller is created in `Stop`. [`start`](Self::start) spawns the
/// cycle thread, which holds each phase for a random duration drawn from the
/// configured range and publishes every flip on a [`PhaseChannel`]. Other
/// threads synchronize with the signal through
/// [`wait_for_go`](Self::wait_for_go).
///
/// Share the controller across threads with an [`Arc`]. Dropping it signals
/// the cycle thread to stop but does not wait for it; use
/// [`shutdown`](Self::shutdown) to stop and join.
pub struct SignalController {
    phase: Arc<AtomicPhase>,
    channel: Arc<PhaseChannel>,
    shutdown_flag: Arc<AtomicBool>,
    lifecycle: Mutex<Lifecycle>,
    config: SignalConfig,
}

impl SignalController {
    /// Creates a controller in the `Stop` phase with the default 4–6 s cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(SignalConfig::default())
    }

    /// Creates a controller in the `Stop` phase with a custom cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidConfig`] if `config` fails
    /// [`SignalConfig::validate`].
    pub fn with_config(config: SignalConfig) -> Result<Self, SignalError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SignalConfig) -> Self {
        Self {
            phase: Arc::new(AtomicPhase::new(Phase::Stop)),
            channel: Arc::new(PhaseChannel::new()),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            lifecycle: Mutex::new(Lifecycle::Idle),
            config,
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns the cycle thread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The controller is already running ([`SignalError::AlreadyStarted`])
    /// - The controller has been shut down ([`SignalError::Stopped`])
    /// - The OS refuses to create the thread ([`SignalError::Spawn`])
    pub fn start(&self) -> Result<(), SignalError> {
        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running(_) => return Err(SignalError::AlreadyStarted),
            Lifecycle::Stopped => return Err(SignalError::Stopped),
        }

        info!(
            min_interval_ms = self.config.min_interval.as_millis() as u64,
            max_interval_ms = self.config.max_interval.as_millis() as u64,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            seed = ?self.config.seed,
            "signal controller starting"
        );

        let mut cycle = CycleThread::new(
            Arc::clone(&self.phase),
            Arc::clone(&self.channel),
            IntervalSampler::from_config(&self.config),
            self.config.poll_interval,
            Arc::clone(&self.shutdown_flag),
        );

        debug!(name = %self.config.thread_name, "spawning cycle thread");
        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                info!("cycle thread started");
                cycle.run();
                info!("cycle thread exiting");
            })
            .map_err(SignalError::Spawn)?;

        *lifecycle = Lifecycle::Running(handle);
        Ok(())
    }

    /// Returns the phase the signal is showing right now.
    ///
    /// Never blocks. The value may be superseded by a flip immediately after
    /// it is read.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.phase.load()
    }

    /// Blocks until the signal publishes a [`Phase::Go`].
    ///
    /// Every `Stop` received in the meantime is discarded. Returning means the
    /// signal turned green at or after the call began, not that it is still
    /// green when the caller resumes. Concurrent waiters compete for each
    /// published value, so one flip releases one waiter.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Stopped`] once the controller is shut down and
    /// no `Go` is pending.
    pub fn wait_for_go(&self) -> Result<(), SignalError> {
        loop {
            match self.channel.receive() {
                Ok(Phase::Go) => return Ok(()),
                Ok(Phase::Stop) => {}
                Err(Closed) => return Err(SignalError::Stopped),
            }
        }
    }

    /// Like [`wait_for_go`](Self::wait_for_go), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Timeout`] if no `Go` arrived in time, or
    /// [`SignalError::Stopped`] once the controller is shut down.
    pub fn wait_for_go_timeout(&self, timeout: Duration) -> Result<(), SignalError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait_for_go();
        };
        loop {
            let now = Instant::now();
            let remaining = if now < deadline {
                deadline.duration_since(now)
            } else {
                Duration::ZERO
            };

            match self.channel.receive_timeout(remaining) {
                Ok(Phase::Go) => return Ok(()),
                Ok(Phase::Stop) => {}
                Err(RecvTimeoutError::Timeout) => return Err(SignalError::Timeout),
                Err(RecvTimeoutError::Closed) => return Err(SignalError::Stopped),
            }
        }
    }

    /// Stops the cycle thread and waits for it to exit.
    ///
    /// This method:
    /// 1. Sets the shutdown flag (the cycle thread sees it within one poll)
    /// 2. Closes the phase channel, releasing every blocked waiter
    /// 3. Joins the cycle thread
    ///
    /// Idempotent. Afterwards `start` and the wait operations report
    /// [`SignalError::Stopped`].
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle();
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped);

        self.shutdown_flag.store(true, Ordering::Release);
        self.channel.close();

        match previous {
            Lifecycle::Running(handle) => {
                info!("signal controller shutdown initiated");
                debug!("waiting for cycle thread to exit");
                if handle.join().is_err() {
                    warn!("cycle thread panicked");
                }
                info!("signal controller shutdown complete");
            }
            Lifecycle::Idle => {
                debug!("signal controller stopped before start");
            }
            Lifecycle::Stopped => {}
        }
    }

    /// Returns `true` between a successful `start` and `shutdown`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Running(_))
    }

    /// Returns the channel phase flips are published on.
    ///
    /// Receiving from it directly competes with `wait_for_go` callers for the
    /// same values.
    #[must_use]
    pub fn channel(&self) -> Arc<PhaseChannel> {
        Arc::clone(&self.channel)
    }

    #[must_use]
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

impl Default for SignalController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalController")
            .field("phase", &self.current_phase())
            .field("running", &self.is_running())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for SignalController {
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if matches!(lifecycle, Lifecycle::Running(_)) {
            warn!("signal controller dropped while running, cycle thread detached");
        }

        // Best-effort stop without joining; the thread exits within one poll.
        self.shutdown_flag.store(true, Ordering::Release);
        self.channel.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SignalConfig {
        SignalConfig {
            min_interval: Duration::from_millis(20),
            max_interval: Duration::from_millis(30),
            poll_interval: Duration::from_millis(1),
            seed: Some(11),
            ..SignalConfig::default()
        }
    }

    #[test]
    fn test_new_controller_is_stopped_and_idle() {
        let controller = SignalController::new();

        assert_eq!(controller.current_phase(), Phase::Stop);
        assert!(!controller.is_running());
        assert_eq!(controller.config(), &SignalConfig::default());
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = SignalConfig {
            poll_interval: Duration::ZERO,
            ..SignalConfig::default()
        };

        assert!(matches!(
            SignalController::with_config(config),
            Err(SignalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_double_start_is_rejected() {
        let controller = SignalController::with_config(fast_config()).unwrap();

        controller.start().unwrap();
        assert!(controller.is_running());
        assert!(matches!(
            controller.start(),
            Err(SignalError::AlreadyStarted)
        ));

        controller.shutdown();
        assert!(!controller.is_running());
    }

    #[test]
    fn test_start_after_shutdown_is_rejected() {
        let controller = SignalController::with_config(fast_config()).unwrap();

        controller.shutdown();
        assert!(matches!(controller.start(), Err(SignalError::Stopped)));
        assert!(matches!(controller.wait_for_go(), Err(SignalError::Stopped)));

        // Idempotent.
        controller.shutdown();
    }

    #[test]
    fn test_wait_for_go_skips_stop() {
        let controller = SignalController::new();
        let channel = controller.channel();

        channel.send(Phase::Stop);
        let waiter = thread::scope(|scope| {
            let handle = scope.spawn(|| controller.wait_for_go_timeout(Duration::from_secs(2)));
            while channel.waiting_receivers() == 0 {
                thread::sleep(Duration::from_millis(1));
            }
            channel.send(Phase::Go);
            handle.join().unwrap()
        });

        assert!(waiter.is_ok());
        assert!(!channel.has_pending());
    }

    #[test]
    fn test_wait_for_go_timeout_expires() {
        let controller = SignalController::new();

        controller.channel().send(Phase::Stop);
        assert!(matches!(
            controller.wait_for_go_timeout(Duration::from_millis(20)),
            Err(SignalError::Timeout)
        ));
    }

    #[test]
    fn test_wait_for_go_timeout_accepts_max_duration() {
        let controller = SignalController::new();

        controller.channel().send(Phase::Go);
        assert!(controller.wait_for_go_timeout(Duration::MAX).is_ok());

        controller.shutdown();
        assert!(matches!(
            controller.wait_for_go_timeout(Duration::MAX),
            Err(SignalError::Stopped)
        ));
    }

    #[test]
    fn test_go_is_visible_after_wait() {
        let controller = SignalController::with_config(fast_config()).unwrap();

        controller.start().unwrap();
        controller
            .wait_for_go_timeout(Duration::from_secs(2))
            .unwrap();
        // The next flip is at least 20ms away.
        assert_eq!(controller.current_phase(), Phase::Go);

        controller.shutdown();
    }

    #[test]
    fn test_drop_closes_channel() {
        let controller = SignalController::with_config(fast_config()).unwrap();
        let channel = controller.channel();

        controller.start().unwrap();
        drop(controller);

        assert!(channel.is_closed());
    }
}
