use std::{env, str::FromStr};

use log::{info, warn};
use papercalc_core::config::Config;

fn override_from_env<T: FromStr + Copy + std::fmt::Display>(name: &str, slot: &mut T) {
    let Ok(raw) = env::var(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            info!("{} = {}", name, value);
            *slot = value;
        }
        Err(_) => warn!("Ignoring invalid {}={:?}; keeping {}", name, raw, slot),
    }
}

/// Defaults, overridden by any `PAPERCALC_*` variables that are set.
pub fn load() -> Config {
    let mut config = Config::default();
    override_from_env("PAPERCALC_TOUCH_DEBOUNCE_MS", &mut config.touch_debounce_ms);
    override_from_env("PAPERCALC_DIM_TIMEOUT_MS", &mut config.dim_timeout_ms);
    override_from_env("PAPERCALC_SLEEP_TIMEOUT_MS", &mut config.sleep_timeout_ms);
    override_from_env("PAPERCALC_IDLE_CHECK_INTERVAL_MS", &mut config.idle_check_interval_ms);
    override_from_env("PAPERCALC_DEFAULT_BRIGHTNESS", &mut config.default_brightness);
    override_from_env("PAPERCALC_LOW_BRIGHTNESS", &mut config.low_brightness);
    override_from_env("PAPERCALC_SLEEP_BRIGHTNESS", &mut config.sleep_brightness);
    override_from_env("PAPERCALC_TICK_DELAY_MS", &mut config.tick_delay_ms);
    override_from_env("PAPERCALC_ASLEEP_TICK_DELAY_MS", &mut config.asleep_tick_delay_ms);
    override_from_env("PAPERCALC_HIGHLIGHT_MS", &mut config.highlight_ms);
    override_from_env("PAPERCALC_POWER_BUTTON_INTERVAL_MS", &mut config.power_button_interval_ms);
    override_from_env("PAPERCALC_POWER_BUTTON_LOCKOUT_MS", &mut config.power_button_lockout_ms);
    override_from_env("PAPERCALC_FAILURE_WINDOW_MS", &mut config.failure_window_ms);
    override_from_env("PAPERCALC_FAILURE_LIMIT", &mut config.failure_limit);
    override_from_env("PAPERCALC_ERROR_RECOVERY_DELAY_MS", &mut config.error_recovery_delay_ms);
    override_from_env("PAPERCALC_RESTART_DELAY_MS", &mut config.restart_delay_ms);
    override_from_env("PAPERCALC_BATTERY_REFRESH_MS", &mut config.battery_refresh_ms);
    override_from_env("PAPERCALC_MEMORY_LOG_INTERVAL_MS", &mut config.memory_log_interval_ms);
    override_from_env("PAPERCALC_SPLASH_MS", &mut config.splash_ms);
    config
}
