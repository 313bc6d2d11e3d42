extern crate alloc;

use alloc::string::ToString;

use embedded_graphics::prelude::Size;
use log::{debug, error, info, warn};

use crate::{
    calculator::{CalculatorState, Key},
    config::Config,
    device::{Board, Capabilities, MemoryStats},
    display::{Display, RefreshMode},
    error::{AppError, DriverError},
    framebuffer::{FrameBuffer, HEIGHT, WIDTH},
    keypad::ButtonRegistry,
    power::{PowerButtonMonitor, PowerManager, PowerState, PowerTransition},
    touch::{self, GestureRecognizer, TouchEdge},
    ui::{RenderQueue, flush_queue, screens},
};

/// Polls spent discarding touches left over from before startup.
const STALE_TOUCH_POLLS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Highlight {
    key: Key,
    until_ms: u64,
}

/// The calculator loop. One call to [`Application::tick`] per loop
/// iteration; the return value is how long the host should wait before the
/// next one.
pub struct Application {
    config: Config,
    caps: Capabilities,
    frame: FrameBuffer,
    rq: RenderQueue,
    calc: CalculatorState,
    buttons: ButtonRegistry,
    gestures: GestureRecognizer,
    power: PowerManager,
    power_button: PowerButtonMonitor,
    highlight: Option<Highlight>,
    battery: Option<u8>,
    next_battery_ms: u64,
    full_redraw: bool,
    readout_dirty: bool,
}

impl Application {
    pub fn new(config: Config, board: &mut impl Board, now_ms: u64) -> Self {
        info!("Initializing calculator");
        let caps = Capabilities::probe(board);
        let power = PowerManager::new(config.power(), now_ms);
        power.apply_backlight(caps.backlight(board));

        for _ in 0..STALE_TOUCH_POLLS {
            board.poll();
            if let Some(panel) = caps.touch(board) {
                touch::drain(panel);
            }
        }

        let battery = caps.battery_percent(board);
        Self {
            config,
            caps,
            frame: FrameBuffer::new(),
            rq: RenderQueue::default(),
            calc: CalculatorState::new(),
            buttons: ButtonRegistry::standard(),
            gestures: GestureRecognizer::new(
                config.touch_debounce_ms,
                Size::new(WIDTH as u32, HEIGHT as u32),
            ),
            power,
            power_button: PowerButtonMonitor::new(
                config.power_button_interval_ms,
                config.power_button_lockout_ms,
            ),
            highlight: None,
            battery,
            next_battery_ms: now_ms.saturating_add(config.battery_refresh_ms),
            full_redraw: true,
            readout_dirty: false,
        }
    }

    /// Shows the splash screen. Returns how long it should stay up. When the
    /// splash cannot be shown a plain startup error screen is attempted.
    pub fn boot(&mut self, display: &mut impl Display) -> Result<u32, AppError> {
        let shown = screens::draw_splash(&mut self.frame, self.battery)
            .map_err(AppError::from)
            .and_then(|_| Ok(display.display(&self.frame, RefreshMode::Full)?));
        match shown {
            Ok(()) => Ok(self.config.splash_ms),
            Err(err) => {
                error!("Startup error: {}", err);
                let message = err.to_string();
                screens::draw_startup_error(&mut self.frame, &message);
                if let Err(draw_err) = display.display(&self.frame, RefreshMode::Full) {
                    warn!("Failed to show startup error: {}", draw_err);
                }
                Err(err)
            }
        }
    }

    pub fn tick<P: Board + Display>(&mut self, platform: &mut P, now_ms: u64) -> Result<u32, AppError> {
        platform.poll();

        if self
            .power_button
            .poll(now_ms, self.caps.power_button(platform))
            && let Some(transition) = self.power.pause()
        {
            self.enter_pause(platform, transition)?;
            return Ok(self.config.tick_delay_ms);
        }

        match self.power.state() {
            PowerState::Paused | PowerState::Asleep => self.poll_presence(platform, now_ms),
            PowerState::Active | PowerState::Dimmed => self.handle_touch(platform, now_ms)?,
        }

        if let Some(highlight) = self.highlight
            && now_ms >= highlight.until_ms
        {
            self.restore_highlight(highlight.key)?;
        }

        if now_ms >= self.next_battery_ms {
            self.refresh_battery(platform, now_ms)?;
        }

        self.present(platform)?;

        if let Some(transition) = self.power.check_idle(now_ms) {
            self.power.apply_backlight(self.caps.backlight(platform));
            if transition.to == PowerState::Asleep {
                self.enter_sleep(platform)?;
            }
        }

        Ok(match self.power.state() {
            PowerState::Asleep => self.config.asleep_tick_delay_ms,
            _ => self.config.tick_delay_ms,
        })
    }

    /// Replaces the panel contents with the fatal error screen.
    pub fn draw_fatal(
        &mut self,
        display: &mut impl Display,
        err: &AppError,
        memory: Option<MemoryStats>,
    ) -> Result<(), DriverError> {
        let message = err.to_string();
        screens::draw_fatal_screen(&mut self.frame, err.kind(), &message, memory);
        self.rq.clear();
        display.display(&self.frame, RefreshMode::Full)
    }

    pub fn calculator(&self) -> &CalculatorState {
        &self.calc
    }

    pub fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn brightness(&self) -> u8 {
        self.power.brightness()
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    pub fn battery(&self) -> Option<u8> {
        self.battery
    }

    pub fn highlighted(&self) -> Option<Key> {
        self.highlight.map(|h| h.key)
    }

    /// While paused or asleep only touch presence matters. The waking
    /// contact is swallowed until the finger lifts.
    fn poll_presence<P: Board>(&mut self, platform: &mut P, now_ms: u64) {
        let sample = touch::read_sample(self.caps.touch(platform));
        if !sample.present {
            return;
        }
        let transition = match self.power.state() {
            PowerState::Asleep => self.power.wake(now_ms),
            _ => self.power.on_touch(now_ms),
        };
        if let Some(transition) = transition {
            self.on_transition(platform, transition);
        }
        self.gestures.suppress_until_lift();
    }

    fn handle_touch<P: Board>(&mut self, platform: &mut P, now_ms: u64) -> Result<(), AppError> {
        match self.gestures.poll(now_ms, self.caps.touch(platform)) {
            TouchEdge::NoEvent => {}
            TouchEdge::PressStarted(_) => {
                if let Some(transition) = self.power.on_touch(now_ms) {
                    self.on_transition(platform, transition);
                }
            }
            TouchEdge::ReleaseEnded(origin) => match self.buttons.hit_test(origin) {
                Some(key) => self.activate(key, now_ms)?,
                None => debug!("Release at ({}, {}) hit no button", origin.x, origin.y),
            },
        }
        Ok(())
    }

    fn activate(&mut self, key: Key, now_ms: u64) -> Result<(), AppError> {
        info!("Button pressed: {}", key.label());
        if let Some(previous) = self.highlight.take() {
            self.restore_highlight(previous.key)?;
        }
        self.calc.apply(key);
        self.gestures.acknowledge_release(now_ms);
        self.readout_dirty = true;

        if let Some(button) = self.buttons.get(key) {
            let rect = screens::draw_button(&mut self.frame, button, Some(button.highlight_fill()))?;
            self.rq.push(rect, RefreshMode::Fast);
            self.highlight = Some(Highlight {
                key,
                until_ms: now_ms.saturating_add(self.config.highlight_ms),
            });
        }
        Ok(())
    }

    fn restore_highlight(&mut self, key: Key) -> Result<(), AppError> {
        self.highlight = None;
        if let Some(button) = self.buttons.get(key) {
            let rect = screens::draw_button(&mut self.frame, button, None)?;
            self.rq.push(rect, RefreshMode::Fast);
        }
        Ok(())
    }

    fn refresh_battery<P: Board>(&mut self, platform: &mut P, now_ms: u64) -> Result<(), AppError> {
        self.next_battery_ms = now_ms.saturating_add(self.config.battery_refresh_ms);
        let level = self.caps.battery_percent(platform);
        if level == self.battery {
            return Ok(());
        }
        debug!("Battery level {:?} -> {:?}", self.battery, level);
        self.battery = level;
        if matches!(self.power.state(), PowerState::Active | PowerState::Dimmed) && !self.full_redraw {
            let rect = screens::draw_header(&mut self.frame, self.battery)?;
            self.rq.push(rect, RefreshMode::Fast);
        }
        Ok(())
    }

    /// Draws whatever is pending and pushes it to the panel. On a panel
    /// failure the queue is dropped and the screen for the current power
    /// state is repainted in full on the next attempt.
    fn present(&mut self, display: &mut impl Display) -> Result<(), AppError> {
        self.render()?;
        if let Err(err) = flush_queue(display, &self.frame, &mut self.rq) {
            self.rq.clear();
            self.full_redraw = true;
            return Err(err.into());
        }
        Ok(())
    }

    fn render(&mut self) -> Result<(), AppError> {
        if self.full_redraw {
            match self.power.state() {
                PowerState::Paused => {
                    screens::draw_pause_screen(&mut self.frame, self.battery)?;
                }
                PowerState::Asleep => {
                    screens::draw_sleep_screen(&mut self.frame)?;
                }
                PowerState::Active | PowerState::Dimmed => {
                    screens::draw_calculator(&mut self.frame, &self.calc, &self.buttons, self.battery)?;
                    if let Some(highlight) = self.highlight
                        && let Some(button) = self.buttons.get(highlight.key)
                    {
                        screens::draw_button(&mut self.frame, button, Some(button.highlight_fill()))?;
                    }
                }
            }
            self.rq.push_full();
            self.full_redraw = false;
            self.readout_dirty = false;
        } else if self.readout_dirty {
            let rect = screens::draw_readout(&mut self.frame, &self.calc)?;
            self.rq.push(rect, RefreshMode::Fast);
            self.readout_dirty = false;
        }
        Ok(())
    }

    fn on_transition<P: Board>(&mut self, platform: &mut P, transition: PowerTransition) {
        self.power.apply_backlight(self.caps.backlight(platform));
        if transition.needs_full_redraw() {
            self.full_redraw = true;
        }
    }

    fn enter_pause<P: Board + Display>(
        &mut self,
        platform: &mut P,
        transition: PowerTransition,
    ) -> Result<(), AppError> {
        debug!("Pausing from {:?}", transition.from);
        self.power.apply_backlight(self.caps.backlight(platform));
        self.highlight = None;
        self.gestures.reset();
        self.rq.clear();
        self.full_redraw = true;
        self.readout_dirty = false;
        self.present(platform)
    }

    fn enter_sleep(&mut self, display: &mut impl Display) -> Result<(), AppError> {
        self.highlight = None;
        self.gestures.reset();
        self.rq.clear();
        self.full_redraw = true;
        self.readout_dirty = false;
        self.present(display)
    }
}
