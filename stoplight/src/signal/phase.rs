//! Signal phases and a lock-free cell for sharing the current one.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The two states a signal cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Phase {
    /// Red: traffic must wait.
    #[default]
    Stop = 0,
    /// Green: traffic may proceed.
    Go = 1,
}

impl Phase {
    /// Returns the phase that follows this one.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Stop => Self::Go,
            Self::Go => Self::Stop,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_go(self) -> bool {
        matches!(self, Self::Go)
    }

    #[inline]
    const fn from_raw(raw: u8) -> Self {
        debug_assert!(raw <= 1);
        if raw == Self::Go as u8 {
            Self::Go
        } else {
            Self::Stop
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => f.write_str("stop"),
            Self::Go => f.write_str("go"),
        }
    }
}

/// A [`Phase`] that can be shared between threads.
///
/// Stores use `Release` and loads use `Acquire`, so a reader that sees a
/// phase also sees every write the writer made before storing it.
#[derive(Debug)]
pub struct AtomicPhase(AtomicU8);

impl AtomicPhase {
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self(AtomicU8::new(phase as u8))
    }

    #[inline]
    #[must_use]
    pub fn load(&self) -> Phase {
        Phase::from_raw(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, phase: Phase) {
        self.0.store(phase as u8, Ordering::Release);
    }

    /// Flips the stored phase and returns the new value.
    #[inline]
    pub fn toggle(&self) -> Phase {
        Phase::from_raw(self.0.fetch_xor(1, Ordering::AcqRel) ^ 1)
    }
}

impl Default for AtomicPhase {
    fn default() -> Self {
        Self::new(Phase::default())
    }
}
