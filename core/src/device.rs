use embedded_graphics::prelude::Point;
use log::{info, warn};

use crate::error::DriverError;

/// Buffered touch controller. Every `next_sample` consumes one reading.
pub trait TouchPanel {
    fn sample_count(&mut self) -> Result<usize, DriverError>;
    fn next_sample(&mut self) -> Result<Point, DriverError>;
}

/// Front light control, 0-100 percent.
pub trait Backlight {
    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError>;
}

pub trait BatteryGauge {
    fn level_percent(&mut self) -> Result<u8, DriverError>;
}

pub trait PowerButton {
    fn is_pressed(&mut self) -> Result<bool, DriverError>;
}

/// Places a board may expose its power button through. Probed in order at
/// startup; the first one present is used from then on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerButtonSource {
    /// Dedicated button input.
    Button,
    /// Press flag latched by the power management chip.
    PowerChip,
    /// Press query on the power management service.
    PowerService,
}

impl PowerButtonSource {
    pub const PROBE_ORDER: [PowerButtonSource; 3] = [
        PowerButtonSource::Button,
        PowerButtonSource::PowerChip,
        PowerButtonSource::PowerService,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryStats {
    pub free: usize,
    pub total: usize,
}

impl MemoryStats {
    pub fn used(&self) -> usize {
        self.total.saturating_sub(self.free)
    }

    pub fn used_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 - (self.free as f32 * 100.0 / self.total as f32)
    }

    /// Less than 30 % of the heap left.
    pub fn is_low(&self) -> bool {
        self.free.saturating_mul(10) < self.total.saturating_mul(3)
    }
}

/// Device services the calculator needs. Every capability is optional and
/// absent by default.
pub trait Board {
    /// Latches fresh touch and button state. Called once at the start of
    /// every tick.
    fn poll(&mut self);

    fn touch(&mut self) -> Option<&mut dyn TouchPanel> {
        None
    }

    fn backlight(&mut self) -> Option<&mut dyn Backlight> {
        None
    }

    fn battery(&mut self) -> Option<&mut dyn BatteryGauge> {
        None
    }

    fn power_button(&mut self, source: PowerButtonSource) -> Option<&mut dyn PowerButton> {
        let _ = source;
        None
    }

    fn memory_stats(&mut self) -> Option<MemoryStats> {
        None
    }
}

/// Which optional capabilities the board offers, resolved once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub touch: bool,
    pub backlight: bool,
    pub battery: bool,
    pub power_button: Option<PowerButtonSource>,
}

impl Capabilities {
    pub fn probe(board: &mut impl Board) -> Self {
        let touch = board.touch().is_some();
        let backlight = board.backlight().is_some();
        let battery = board.battery().is_some();
        let power_button = PowerButtonSource::PROBE_ORDER
            .into_iter()
            .find(|source| board.power_button(*source).is_some());

        if !touch {
            warn!("Touch panel not available; input disabled");
        }
        if !backlight {
            info!("No brightness control on this hardware");
        }
        info!(
            "Capabilities: touch={} backlight={} battery={} power_button={:?}",
            touch, backlight, battery, power_button
        );
        Self {
            touch,
            backlight,
            battery,
            power_button,
        }
    }

    pub fn touch<'a, B: Board>(&self, board: &'a mut B) -> Option<&'a mut dyn TouchPanel> {
        if self.touch { board.touch() } else { None }
    }

    pub fn backlight<'a, B: Board>(&self, board: &'a mut B) -> Option<&'a mut dyn Backlight> {
        if self.backlight {
            board.backlight()
        } else {
            None
        }
    }

    pub fn power_button<'a, B: Board>(&self, board: &'a mut B) -> Option<&'a mut dyn PowerButton> {
        self.power_button
            .and_then(move |source| board.power_button(source))
    }

    /// Battery percentage, or `None` when the gauge is absent or fails.
    pub fn battery_percent<B: Board>(&self, board: &mut B) -> Option<u8> {
        if !self.battery {
            return None;
        }
        let gauge = board.battery()?;
        match gauge.level_percent() {
            Ok(percent) => Some(percent.min(100)),
            Err(err) => {
                warn!("Failed to get battery information: {}", err);
                None
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatteryLevel {
    Normal,
    Low,
    Critical,
}

impl BatteryLevel {
    pub fn from_percent(percent: u8) -> Self {
        if percent < 15 {
            BatteryLevel::Critical
        } else if percent < 30 {
            BatteryLevel::Low
        } else {
            BatteryLevel::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatteryLevel::Normal => "ok",
            BatteryLevel::Low => "low",
            BatteryLevel::Critical => "critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlagButton(bool);

    impl PowerButton for FlagButton {
        fn is_pressed(&mut self) -> Result<bool, DriverError> {
            Ok(self.0)
        }
    }

    struct FailingGauge;

    impl BatteryGauge for FailingGauge {
        fn level_percent(&mut self) -> Result<u8, DriverError> {
            Err(DriverError::Failed("i2c timeout"))
        }
    }

    struct ChipOnlyBoard {
        chip: FlagButton,
        service: FlagButton,
        gauge: FailingGauge,
    }

    impl Board for ChipOnlyBoard {
        fn poll(&mut self) {}

        fn battery(&mut self) -> Option<&mut dyn BatteryGauge> {
            Some(&mut self.gauge)
        }

        fn power_button(&mut self, source: PowerButtonSource) -> Option<&mut dyn PowerButton> {
            match source {
                PowerButtonSource::Button => None,
                PowerButtonSource::PowerChip => Some(&mut self.chip),
                PowerButtonSource::PowerService => Some(&mut self.service),
            }
        }
    }

    fn board() -> ChipOnlyBoard {
        ChipOnlyBoard {
            chip: FlagButton(true),
            service: FlagButton(false),
            gauge: FailingGauge,
        }
    }

    #[test]
    fn first_available_power_button_wins() {
        let mut board = board();
        let caps = Capabilities::probe(&mut board);
        assert_eq!(caps.power_button, Some(PowerButtonSource::PowerChip));
        let pressed = caps.power_button(&mut board).unwrap().is_pressed();
        assert_eq!(pressed, Ok(true));
    }

    #[test]
    fn missing_capabilities_are_reported_absent() {
        let mut board = board();
        let caps = Capabilities::probe(&mut board);
        assert!(!caps.touch);
        assert!(!caps.backlight);
        assert!(caps.touch(&mut board).is_none());
        assert!(caps.backlight(&mut board).is_none());
    }

    #[test]
    fn failing_battery_degrades_to_none() {
        let mut board = board();
        let caps = Capabilities::probe(&mut board);
        assert!(caps.battery);
        assert_eq!(caps.battery_percent(&mut board), None);
    }

    #[test]
    fn battery_levels() {
        assert_eq!(BatteryLevel::from_percent(80), BatteryLevel::Normal);
        assert_eq!(BatteryLevel::from_percent(29), BatteryLevel::Low);
        assert_eq!(BatteryLevel::from_percent(14), BatteryLevel::Critical);
    }

    #[test]
    fn memory_thresholds() {
        let stats = MemoryStats { free: 20, total: 100 };
        assert!(stats.is_low());
        assert_eq!(stats.used(), 80);
        assert!(!MemoryStats { free: 50, total: 100 }.is_low());
    }
}
