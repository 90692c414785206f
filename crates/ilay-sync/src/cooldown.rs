use std::time::Duration;

use tokio::time::Instant;

use crate::error::SendError;

/// The send throttle: after any submission (success or failure) the gate
/// closes for a fixed window and further sends are rejected locally, with no
/// append attempted. This guards against accidental flooding from rapid
/// re-submission; it is not a server-side abuse guarantee.
#[derive(Debug)]
pub struct SendGate {
    window: Duration,
    blocked_until: Option<Instant>,
}

impl SendGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            blocked_until: None,
        }
    }

    /// Err(Cooldown) while the window is open.
    pub fn check(&self) -> Result<(), SendError> {
        match self.blocked_until {
            Some(until) if Instant::now() < until => Err(SendError::Cooldown),
            _ => Ok(()),
        }
    }

    /// Start (or restart) the window. Called after every submission.
    pub fn arm(&mut self) {
        self.blocked_until = Some(Instant::now() + self.window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fresh_gate_is_open() {
        let gate = SendGate::new(Duration::from_millis(1500));
        assert!(gate.check().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn armed_gate_rejects_until_window_elapses() {
        let mut gate = SendGate::new(Duration::from_millis(1500));
        gate.arm();

        assert!(matches!(gate.check(), Err(SendError::Cooldown)));

        tokio::time::advance(Duration::from_millis(1400)).await;
        assert!(matches!(gate.check(), Err(SendError::Cooldown)));

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(gate.check().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_restarts_the_window() {
        let mut gate = SendGate::new(Duration::from_millis(1000));
        gate.arm();
        tokio::time::advance(Duration::from_millis(900)).await;

        gate.arm();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(matches!(gate.check(), Err(SendError::Cooldown)));
    }
}
