use std::time::Duration;

/// Engine tuning knobs. `Default` matches the production values.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How many of the most recent messages to load when a conversation
    /// opens (and again on every reconnect). No backward pagination beyond
    /// this window.
    pub seed_limit: u32,

    /// Minimum interval between send attempts, armed after every submission
    /// whether it succeeded or failed. A client-side throttle against
    /// accidental flooding, not a security boundary.
    pub send_cooldown: Duration,

    /// Bounded wait on the origin-IP lookup at session start. On timeout the
    /// session proceeds without an IP; ban enforcement is best-effort.
    pub ip_lookup_timeout: Duration,

    /// Base delay for resubscribe attempts after a dropped stream; doubles
    /// per attempt.
    pub resubscribe_base_delay: Duration,

    /// Give up resubscribing after this many consecutive failures.
    pub max_resubscribe_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            seed_limit: 100,
            send_cooldown: Duration::from_millis(1500),
            ip_lookup_timeout: Duration::from_secs(2),
            resubscribe_base_delay: Duration::from_millis(500),
            max_resubscribe_attempts: 5,
        }
    }
}
