//! The idle watchdog.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::policy::IdlePolicy;

/// Observable watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogState {
    /// Not counting.
    Unarmed,
    /// Counting towards the threshold.
    Armed,
    /// Fired in the current arm cycle. Only a fresh `arm` leaves this state.
    Fired,
}

/// Fires at most once per arm cycle after `threshold` of uninterrupted
/// idle time.
#[derive(Debug, Clone, Default)]
pub struct IdleWatchdog {
    policy: IdlePolicy,
    armed: bool,
    elapsed: Duration,
    threshold: Duration,
    fired: bool,
}

impl IdleWatchdog {
    /// Creates an unarmed watchdog with the given interaction policy.
    #[must_use]
    pub fn new(policy: IdlePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Starts a new arm cycle.
    pub fn arm(&mut self, threshold: Duration) {
        self.armed = true;
        self.elapsed = Duration::ZERO;
        self.threshold = threshold;
        self.fired = false;
        debug!(threshold_secs = threshold.as_secs_f64(), "idle watchdog armed");
    }

    /// Advances the countdown. Returns `true` only on the tick that fires.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.armed || self.fired {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed < self.threshold {
            return false;
        }
        self.fired = true;
        info!(
            elapsed_secs = self.elapsed.as_secs_f64(),
            threshold_secs = self.threshold.as_secs_f64(),
            "idle timeout"
        );
        true
    }

    /// Reports a qualifying player interaction.
    pub fn notify_interaction(&mut self) {
        if !self.armed || self.fired {
            return;
        }
        match self.policy {
            IdlePolicy::DisarmOnInteraction => {
                self.armed = false;
                debug!("idle watchdog disarmed by interaction");
            }
            IdlePolicy::RestartOnInteraction => {
                self.elapsed = Duration::ZERO;
            }
        }
    }

    /// Stops counting. A watchdog that already fired stays `Fired`.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Returns to the initial unarmed state, keeping the policy.
    pub fn reset(&mut self) {
        *self = Self::new(self.policy);
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> WatchdogState {
        if self.fired {
            WatchdogState::Fired
        } else if self.armed {
            WatchdogState::Armed
        } else {
            WatchdogState::Unarmed
        }
    }

    #[must_use]
    pub fn policy(&self) -> IdlePolicy {
        self.policy
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}
