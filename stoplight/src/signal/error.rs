//! Controller error type.

/// Errors reported by [`SignalController`](super::SignalController).
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// [`start`](super::SignalController::start) was called on a running
    /// controller.
    #[error("signal controller already started")]
    AlreadyStarted,
    /// The controller has been shut down.
    #[error("signal controller stopped")]
    Stopped,
    /// No go phase arrived before the deadline.
    #[error("timed out waiting for go")]
    Timeout,
    /// The configuration describes an impossible cycle.
    #[error("invalid signal config: {0}")]
    InvalidConfig(String),
    /// The cycle thread could not be created.
    #[error("failed to spawn cycle thread: {0}")]
    Spawn(#[source] std::io::Error),
}
