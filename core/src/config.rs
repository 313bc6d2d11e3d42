/// Timing and brightness policy for the calculator. All durations are in
/// milliseconds of the monotonic clock handed to [`crate::application::Application::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub touch_debounce_ms: u64,
    pub dim_timeout_ms: u64,
    pub sleep_timeout_ms: u64,
    pub idle_check_interval_ms: u64,
    pub default_brightness: u8,
    pub low_brightness: u8,
    pub sleep_brightness: u8,
    pub tick_delay_ms: u32,
    pub asleep_tick_delay_ms: u32,
    pub highlight_ms: u64,
    pub power_button_interval_ms: u64,
    pub power_button_lockout_ms: u64,
    pub failure_window_ms: u64,
    pub failure_limit: u32,
    pub error_recovery_delay_ms: u32,
    pub restart_delay_ms: u32,
    pub battery_refresh_ms: u64,
    pub memory_log_interval_ms: u64,
    pub splash_ms: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            touch_debounce_ms: 500,
            dim_timeout_ms: 60_000,
            sleep_timeout_ms: 300_000,
            idle_check_interval_ms: 5_000,
            default_brightness: 100,
            low_brightness: 30,
            sleep_brightness: 0,
            tick_delay_ms: 100,
            asleep_tick_delay_ms: 500,
            highlight_ms: 150,
            power_button_interval_ms: 1_000,
            power_button_lockout_ms: 5_000,
            failure_window_ms: 5_000,
            failure_limit: 5,
            error_recovery_delay_ms: 500,
            restart_delay_ms: 3_000,
            battery_refresh_ms: 30_000,
            memory_log_interval_ms: 10_000,
            splash_ms: 800,
        }
    }

    pub fn power(&self) -> PowerConfig {
        PowerConfig {
            dim_timeout_ms: self.dim_timeout_ms,
            sleep_timeout_ms: self.sleep_timeout_ms,
            check_interval_ms: self.idle_check_interval_ms,
            default_brightness: self.default_brightness,
            low_brightness: self.low_brightness,
            sleep_brightness: self.sleep_brightness,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// The subset of [`Config`] the power manager works from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerConfig {
    pub dim_timeout_ms: u64,
    pub sleep_timeout_ms: u64,
    pub check_interval_ms: u64,
    pub default_brightness: u8,
    pub low_brightness: u8,
    pub sleep_brightness: u8,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Config::new().power()
    }
}
