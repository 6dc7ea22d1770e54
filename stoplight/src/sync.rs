//! Synchronization primitives for in-process communication.
//!
//! This module provides the channels threads use to hand state to each
//! other within the same process.

pub mod latest;

pub use latest::{Closed, LatestChannel, RecvTimeoutError, Timeout};
