//! Loop supervision: per-tick failure accounting, restart policy and the
//! periodic memory report.

use log::{error, info, warn};

use crate::{
    application::Application,
    config::Config,
    device::{Board, MemoryStats},
    display::Display,
    error::AppError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue { delay_ms: u32 },
    /// The fatal screen is up; wait `delay_ms` before ticking again. The next
    /// tick starts from a fresh application.
    Restart { delay_ms: u32 },
}

impl TickOutcome {
    pub fn delay_ms(&self) -> u32 {
        match *self {
            TickOutcome::Continue { delay_ms } | TickOutcome::Restart { delay_ms } => delay_ms,
        }
    }
}

/// Consecutive failures, counted only while they arrive within `window_ms`
/// of each other.
#[derive(Clone, Copy, Debug)]
pub struct FailureTracker {
    window_ms: u64,
    limit: u32,
    count: u32,
    last_failure_ms: Option<u64>,
}

impl FailureTracker {
    pub fn new(window_ms: u64, limit: u32) -> Self {
        Self {
            window_ms,
            limit,
            count: 0,
            last_failure_ms: None,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn record_success(&mut self) {
        self.count = 0;
    }

    /// Returns the updated count.
    pub fn record_failure(&mut self, now_ms: u64) -> u32 {
        let recent = self
            .last_failure_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.window_ms);
        self.count = if recent { self.count + 1 } else { 1 };
        self.last_failure_ms = Some(now_ms);
        self.count
    }

    pub fn exceeded(&self) -> bool {
        self.count > self.limit
    }
}

pub struct Supervisor {
    config: Config,
    app: Application,
    failures: FailureTracker,
    next_memory_log_ms: u64,
    restart_pending: bool,
}

impl Supervisor {
    pub fn new(config: Config, board: &mut impl Board, now_ms: u64) -> Self {
        if let Some(stats) = board.memory_stats() {
            log_memory(&stats);
        }
        Self {
            config,
            app: Application::new(config, board, now_ms),
            failures: FailureTracker::new(config.failure_window_ms, config.failure_limit),
            next_memory_log_ms: now_ms.saturating_add(config.memory_log_interval_ms),
            restart_pending: false,
        }
    }

    pub fn boot(&mut self, display: &mut impl Display) -> Result<u32, AppError> {
        self.app.boot(display)
    }

    pub fn application(&self) -> &Application {
        &self.app
    }

    pub fn failures(&self) -> &FailureTracker {
        &self.failures
    }

    pub fn tick<P: Board + Display>(&mut self, platform: &mut P, now_ms: u64) -> TickOutcome {
        if self.restart_pending {
            info!("Restarting calculator");
            self.app = Application::new(self.config, platform, now_ms);
            self.failures = FailureTracker::new(self.config.failure_window_ms, self.config.failure_limit);
            self.restart_pending = false;
        }

        if now_ms >= self.next_memory_log_ms {
            self.next_memory_log_ms = now_ms.saturating_add(self.config.memory_log_interval_ms);
            if let Some(stats) = platform.memory_stats() {
                log_memory(&stats);
            }
        }

        match self.app.tick(platform, now_ms) {
            Ok(delay_ms) => {
                self.failures.record_success();
                TickOutcome::Continue { delay_ms }
            }
            Err(err) => {
                let count = self.failures.record_failure(now_ms);
                error!("Loop error {}: {} - {}", count, err.kind(), err);
                if !self.failures.exceeded() {
                    return TickOutcome::Continue {
                        delay_ms: self.config.error_recovery_delay_ms,
                    };
                }

                let memory = platform.memory_stats();
                if let Err(draw_err) = self.app.draw_fatal(platform, &err, memory) {
                    error!("Failed to show error screen: {}", draw_err);
                }
                self.restart_pending = true;
                TickOutcome::Restart {
                    delay_ms: self.config.restart_delay_ms,
                }
            }
        }
    }
}

fn log_memory(stats: &MemoryStats) {
    info!(
        "Memory usage: {:.1}KB used / {:.1}KB total ({:.1}% used)",
        stats.used() as f32 / 1024.0,
        stats.total as f32 / 1024.0,
        stats.used_percent()
    );
    if stats.is_low() {
        warn!(
            "Low memory: {:.1}KB free of {:.1}KB",
            stats.free as f32 / 1024.0,
            stats.total as f32 / 1024.0
        );
    }
}
