use log::{debug, info, warn};

use crate::{
    config::PowerConfig,
    device::{Backlight, PowerButton},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerState {
    Active,
    Dimmed,
    Asleep,
    /// Overlay entered from the power button. Only a touch leaves it.
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerTransition {
    pub from: PowerState,
    pub to: PowerState,
}

impl PowerTransition {
    /// Coming back from a blanked or paused screen needs the whole
    /// calculator drawn again.
    pub fn needs_full_redraw(&self) -> bool {
        self.to == PowerState::Active
            && matches!(self.from, PowerState::Asleep | PowerState::Paused)
    }
}

pub struct PowerManager {
    state: PowerState,
    last_activity_ms: u64,
    last_check_ms: u64,
    config: PowerConfig,
}

impl PowerManager {
    pub fn new(config: PowerConfig, now_ms: u64) -> Self {
        Self {
            state: PowerState::Active,
            last_activity_ms: now_ms,
            last_check_ms: now_ms,
            config,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms)
    }

    /// Backlight level for the current state.
    pub fn brightness(&self) -> u8 {
        match self.state {
            PowerState::Active | PowerState::Paused => self.config.default_brightness,
            PowerState::Dimmed => self.config.low_brightness,
            PowerState::Asleep => self.config.sleep_brightness,
        }
    }

    /// Idle-timeout evaluation, throttled to the check interval. Paused and
    /// Asleep are never left or entered from here.
    pub fn check_idle(&mut self, now_ms: u64) -> Option<PowerTransition> {
        if matches!(self.state, PowerState::Paused | PowerState::Asleep) {
            return None;
        }
        if now_ms.saturating_sub(self.last_check_ms) < self.config.check_interval_ms {
            return None;
        }
        self.last_check_ms = now_ms;

        let idle = self.idle_ms(now_ms);
        if idle >= self.config.sleep_timeout_ms {
            info!("Entering sleep mode after {} ms idle", idle);
            return self.transition(PowerState::Asleep);
        }
        if idle >= self.config.dim_timeout_ms && self.state == PowerState::Active {
            info!("Entering power save mode (reducing brightness)");
            return self.transition(PowerState::Dimmed);
        }
        None
    }

    /// Touch contact. Leaves every other state for Active.
    pub fn on_touch(&mut self, now_ms: u64) -> Option<PowerTransition> {
        self.last_activity_ms = now_ms;
        match self.state {
            PowerState::Active => None,
            PowerState::Paused => {
                info!("Resuming from pause screen due to touch");
                self.transition(PowerState::Active)
            }
            PowerState::Asleep => {
                info!("Waking up from sleep mode");
                self.transition(PowerState::Active)
            }
            PowerState::Dimmed => self.transition(PowerState::Active),
        }
    }

    /// Explicit wake request. Does not leave Paused.
    pub fn wake(&mut self, now_ms: u64) -> Option<PowerTransition> {
        self.last_activity_ms = now_ms;
        match self.state {
            PowerState::Asleep => {
                info!("Waking up from sleep mode");
                self.transition(PowerState::Active)
            }
            PowerState::Dimmed => self.transition(PowerState::Active),
            PowerState::Active | PowerState::Paused => None,
        }
    }

    /// Power button. Allowed from any state.
    pub fn pause(&mut self) -> Option<PowerTransition> {
        if self.state == PowerState::Paused {
            return None;
        }
        info!("Power button pressed - pausing application");
        self.transition(PowerState::Paused)
    }

    /// Pushes the level for the current state to the front light. A missing
    /// or failing control is logged and otherwise ignored.
    pub fn apply_backlight(&self, backlight: Option<&mut dyn Backlight>) {
        let level = self.brightness();
        match backlight {
            Some(backlight) => {
                if let Err(err) = backlight.set_brightness(level) {
                    warn!("Failed to set brightness to {}: {}", level, err);
                }
            }
            None => debug!("No brightness control; skipping level {}", level),
        }
    }

    fn transition(&mut self, to: PowerState) -> Option<PowerTransition> {
        let from = self.state;
        if from == to {
            return None;
        }
        self.state = to;
        debug!("Power state {:?} -> {:?}", from, to);
        Some(PowerTransition { from, to })
    }
}

/// Rate-limited power button polling. After a press is seen the button is
/// ignored for the lockout period so a held button fires once.
pub struct PowerButtonMonitor {
    interval_ms: u64,
    lockout_ms: u64,
    next_check_ms: Option<u64>,
}

impl PowerButtonMonitor {
    pub fn new(interval_ms: u64, lockout_ms: u64) -> Self {
        Self {
            interval_ms,
            lockout_ms,
            next_check_ms: None,
        }
    }

    pub fn poll(&mut self, now_ms: u64, button: Option<&mut dyn PowerButton>) -> bool {
        if self.next_check_ms.is_some_and(|next| now_ms < next) {
            return false;
        }
        self.next_check_ms = Some(now_ms.saturating_add(self.interval_ms));

        let Some(button) = button else {
            return false;
        };
        match button.is_pressed() {
            Ok(true) => {
                info!("Power button detected");
                self.next_check_ms = Some(
                    now_ms
                        .saturating_add(self.lockout_ms)
                        .saturating_add(self.interval_ms),
                );
                true
            }
            Ok(false) => false,
            Err(err) => {
                warn!("Power button check error: {}", err);
                false
            }
        }
    }
}
