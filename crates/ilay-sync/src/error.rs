use thiserror::Error;

/// Why a send was rejected or failed. Nothing here is fatal: the caller
/// keeps the original text and decides whether to resubmit.
#[derive(Debug, Error)]
pub enum SendError {
    /// Text was empty after trimming.
    #[error("message is empty")]
    Empty,

    /// Rejected locally by the cooldown window; no append was attempted.
    #[error("send cooldown active")]
    Cooldown,

    /// The persistence service rejected or never received the append.
    #[error("secure channel error: {0}")]
    ChannelFailure(anyhow::Error),
}

/// Stream establishment failures. These drive reconnect-with-backoff and a
/// fresh reseed; they only surface to the caller once retries exhaust.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("failed to establish event stream: {0}")]
    Connect(anyhow::Error),

    #[error("event stream closed")]
    Closed,

    #[error("gave up resubscribing after {0} attempts")]
    RetriesExhausted(u32),
}
