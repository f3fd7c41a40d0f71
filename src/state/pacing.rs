use std::time::Duration;

/// Delay before advancing each intermediate task step
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(800);

/// Delay before the last task step is marked done
pub const DEFAULT_FINAL_STEP_DELAY: Duration = Duration::from_millis(500);

/// Delay between the last step completing and the switch to results
pub const DEFAULT_RESULTS_DELAY: Duration = Duration::from_millis(500);

/// How often the detailed log panel re-fetches backend logs
pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How many backend log lines to ask for per poll
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Cosmetic pacing of the task list once the backend has answered.
/// None of these reflect real backend progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub step_delay: Duration,
    pub final_step_delay: Duration,
    pub results_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            final_step_delay: DEFAULT_FINAL_STEP_DELAY,
            results_delay: DEFAULT_RESULTS_DELAY,
        }
    }
}

impl Pacing {
    /// No artificial delays at all
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
            final_step_delay: Duration::ZERO,
            results_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPolling {
    pub interval: Duration,
    pub limit: usize,
}

impl Default for LogPolling {
    fn default() -> Self {
        Self {
            interval: DEFAULT_LOG_POLL_INTERVAL,
            limit: DEFAULT_LOG_LIMIT,
        }
    }
}
