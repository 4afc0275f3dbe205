//! Pacing policy between successful productions.
//!
//! Stages that hit an external service pause for a fixed interval after
//! every successful production so repeated scheduled runs stay polite.
//! The policy is injected into the runner rather than baked into stage
//! bodies, keeping pacing decisions in one place.

use tokio::time::{sleep, Duration};

/// Fixed-delay pacer.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    /// Pause for `delay` after each successful production.
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// No pausing at all (purely local stages).
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
