use chrono::{DateTime, Duration, Local};
use tracing::info;

/// Throughput counters, logged and reset once per interval
#[derive(Debug, Clone)]
pub struct TickStats {
    pub ticks: u64,
    pub controller_events: u64,
    pub injected_events: u64,
    pub failed_ticks: u64,
    last_log_time: DateTime<Local>,
    log_interval: Duration,
}

impl TickStats {
    pub fn new(log_interval: Duration) -> Self {
        Self {
            ticks: 0,
            controller_events: 0,
            injected_events: 0,
            failed_ticks: 0,
            last_log_time: Local::now(),
            log_interval,
        }
    }

    pub fn record(&mut self, controller_events: usize, injected_events: usize) {
        self.ticks += 1;
        self.controller_events += controller_events as u64;
        self.injected_events += injected_events as u64;
    }

    pub fn record_failure(&mut self) {
        self.ticks += 1;
        self.failed_ticks += 1;
    }

    /// Logs and resets the counters once the interval has passed
    pub fn maybe_log(&mut self) -> bool {
        let now = Local::now();
        if now - self.last_log_time <= self.log_interval {
            return false;
        }

        let seconds = self.log_interval.num_seconds().max(1) as f64;
        info!(
            "Bridge stats: {} ticks ({} failed), {} controller events, {} injected events in last {} seconds (avg {:.2} injected/sec)",
            self.ticks,
            self.failed_ticks,
            self.controller_events,
            self.injected_events,
            self.log_interval.num_seconds(),
            self.injected_events as f64 / seconds
        );

        self.ticks = 0;
        self.controller_events = 0;
        self.injected_events = 0;
        self.failed_ticks = 0;
        self.last_log_time = now;
        true
    }
}
