//! Consecutive-failure policy

use serde::Serialize;
use tracing::warn;

/// How the engine has been doing lately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Health {
    Healthy,
    /// Some recent ticks failed, but fewer than the threshold
    Degraded { consecutive: u32 },
    /// Failing for at least the threshold, or the process is gone
    Persistent { consecutive: u32 },
}

impl Health {
    pub fn is_persistent(&self) -> bool {
        matches!(self, Health::Persistent { .. })
    }
}

/// Counts consecutive failed ticks
#[derive(Debug, Clone)]
pub struct FailureTracker {
    threshold: u32,
    consecutive: u32,
    fatal: bool,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        FailureTracker {
            threshold: threshold.max(1),
            consecutive: 0,
            fatal: false,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
        self.fatal = false;
    }

    /// Records a failed tick; `fatal` marks failures no retry can fix
    pub fn record_failure(&mut self, fatal: bool) {
        let was_persistent = self.health().is_persistent();
        self.consecutive = self.consecutive.saturating_add(1);
        self.fatal |= fatal;

        if !was_persistent && self.health().is_persistent() {
            warn!(
                consecutive = self.consecutive,
                process_gone = self.fatal,
                "engine is failing persistently"
            );
        }
    }

    pub fn health(&self) -> Health {
        match self.consecutive {
            0 => Health::Healthy,
            consecutive if self.fatal || consecutive >= self.threshold => {
                Health::Persistent { consecutive }
            }
            consecutive => Health::Degraded { consecutive },
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}
