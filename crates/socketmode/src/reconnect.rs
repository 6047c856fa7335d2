//! Back-off policy for re-establishing a Socket Mode session.
//!
//! The dispatcher reconnects once per failure with no delay.  This policy
//! only paces [`SocketModeClient::run`](crate::client::SocketModeClient::run)
//! when the handshake or dial itself keeps failing.

use std::time::Duration;

use sb_domain::config::ReconnectConfig;

/// Jittered exponential back-off between session recovery attempts.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    /// Delay before the first recovery attempt.
    pub initial_delay: Duration,
    /// Cap applied before jitter.
    pub max_delay: Duration,
    /// Growth factor per failed attempt.
    pub backoff_factor: f64,
    /// Consecutive failures tolerated before giving up; `0` is unlimited.
    pub max_attempts: u32,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectBackoff {
    fn from(cfg: &ReconnectConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(cfg.initial_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            backoff_factor: cfg.backoff_factor,
            max_attempts: cfg.max_attempts,
        }
    }
}

impl ReconnectBackoff {
    /// Delay before recovery attempt `attempt` (0-indexed), with up to 25%
    /// jitter on top of the capped exponential value.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.backoff_factor.max(0.0).powi(attempt.min(i32::MAX as u32) as i32);
        let base = self.initial_delay.mul_f64(exp.min(f64::from(u32::MAX)));
        let capped = base.min(self.max_delay);
        capped + capped.mul_f64(0.25 * jitter_fraction(attempt))
    }

    pub fn should_give_up(&self, attempt: u32) -> bool {
        self.max_attempts != 0 && attempt >= self.max_attempts
    }
}

/// Deterministic spread in `[0, 1)` so many bots restarting together do
/// not hammer the handshake endpoint in lockstep.
fn jitter_fraction(attempt: u32) -> f64 {
    let mixed = attempt.wrapping_add(1).wrapping_mul(0x9E37_79B9).rotate_left(7);
    f64::from(mixed) / (f64::from(u32::MAX) + 1.0)
}
