use std::{collections::VecDeque, time::Instant};

use embedded_graphics::{pixelcolor::GrayColor, prelude::Point};
use log::trace;
use papercalc_core::{
    device::{Backlight, BatteryGauge, Board, PowerButton, PowerButtonSource, TouchPanel},
    display::{Display, HEIGHT, RefreshMode, WIDTH},
    error::DriverError,
    framebuffer::FrameBuffer,
    ui::Rect,
};

const DISPLAY_BUFFER_SIZE: usize = WIDTH * HEIGHT;

#[derive(Default)]
struct MouseTouch {
    buffer: VecDeque<Point>,
}

impl TouchPanel for MouseTouch {
    fn sample_count(&mut self) -> Result<usize, DriverError> {
        Ok(self.buffer.len())
    }

    fn next_sample(&mut self) -> Result<Point, DriverError> {
        self.buffer
            .pop_front()
            .ok_or(DriverError::Failed("touch buffer empty"))
    }
}

struct FrontLight {
    level: u8,
}

impl Backlight for FrontLight {
    fn set_brightness(&mut self, percent: u8) -> Result<(), DriverError> {
        self.level = percent.min(100);
        Ok(())
    }
}

/// Drains one percent per minute of uptime.
struct SimBattery {
    started: Instant,
}

impl BatteryGauge for SimBattery {
    fn level_percent(&mut self) -> Result<u8, DriverError> {
        let minutes = self.started.elapsed().as_secs() / 60;
        Ok(100u64.saturating_sub(minutes).max(5) as u8)
    }
}

/// `P` on the keyboard. Latched until read.
#[derive(Default)]
struct PowerKey {
    latched: bool,
}

impl PowerButton for PowerKey {
    fn is_pressed(&mut self) -> Result<bool, DriverError> {
        Ok(std::mem::take(&mut self.latched))
    }
}

/// Window standing in for the panel, with the mouse as the touch screen.
pub struct MinifbDisplay {
    // Panel contents at full brightness
    panel: Vec<u32>,
    // What the window shows after front light shading
    display_buffer: Vec<u32>,
    shown_level: u8,
    window: minifb::Window,
    touch: MouseTouch,
    light: FrontLight,
    battery: SimBattery,
    power_key: PowerKey,
}

impl MinifbDisplay {
    pub fn new(window: minifb::Window) -> Self {
        Self {
            panel: vec![0xFFFFFFFF; DISPLAY_BUFFER_SIZE],
            display_buffer: vec![0xFFFFFFFF; DISPLAY_BUFFER_SIZE],
            shown_level: 100,
            window,
            touch: MouseTouch::default(),
            light: FrontLight { level: 100 },
            battery: SimBattery {
                started: Instant::now(),
            },
            power_key: PowerKey::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    fn blit(&mut self, frame: &FrameBuffer, region: Rect) {
        let region = region.clamp_to(WIDTH as i32, HEIGHT as i32);
        for y in region.y..region.y + region.h {
            for x in region.x..region.x + region.w {
                if let Some(color) = frame.pixel(x, y) {
                    let v = color.luma() as u32 * 17;
                    self.panel[y as usize * WIDTH + x as usize] = 0xFF000000 | v << 16 | v << 8 | v;
                }
            }
        }
    }

    /// Front light off still leaves a readable e-paper image, just darker.
    fn present(&mut self) -> Result<(), DriverError> {
        let factor = 60 + self.light.level as u32 * 40 / 100;
        for (out, px) in self.display_buffer.iter_mut().zip(self.panel.iter()) {
            let v = (px & 0xFF) * factor / 100;
            *out = 0xFF000000 | v << 16 | v << 8 | v;
        }
        self.shown_level = self.light.level;
        self.window
            .update_with_buffer(&self.display_buffer, WIDTH, HEIGHT)
            .map_err(|_| DriverError::Failed("window update failed"))
    }
}

impl Display for MinifbDisplay {
    fn display(&mut self, frame: &FrameBuffer, mode: RefreshMode) -> Result<(), DriverError> {
        trace!("Full blit ({:?})", mode);
        self.blit(frame, Rect::new(0, 0, WIDTH as i32, HEIGHT as i32));
        self.present()
    }

    fn display_region(
        &mut self,
        frame: &FrameBuffer,
        region: Rect,
        mode: RefreshMode,
    ) -> Result<(), DriverError> {
        trace!("Region blit {:?} ({:?})", region, mode);
        self.blit(frame, region);
        self.present()
    }
}

impl Board for MinifbDisplay {
    fn poll(&mut self) {
        if self.light.level != self.shown_level {
            // Backlight changes show up without a panel refresh.
            if self.present().is_err() {
                self.window.update();
            }
        } else {
            self.window.update();
        }

        self.touch.buffer.clear();
        if self.window.get_mouse_down(minifb::MouseButton::Left)
            && let Some((x, y)) = self.window.get_mouse_pos(minifb::MouseMode::Discard)
        {
            self.touch.buffer.push_back(Point::new(x as i32, y as i32));
        }
        if self.window.is_key_pressed(minifb::Key::P, minifb::KeyRepeat::No) {
            self.power_key.latched = true;
        }
    }

    fn touch(&mut self) -> Option<&mut dyn TouchPanel> {
        Some(&mut self.touch)
    }

    fn backlight(&mut self) -> Option<&mut dyn Backlight> {
        Some(&mut self.light)
    }

    fn battery(&mut self) -> Option<&mut dyn BatteryGauge> {
        Some(&mut self.battery)
    }

    fn power_button(&mut self, source: PowerButtonSource) -> Option<&mut dyn PowerButton> {
        match source {
            PowerButtonSource::Button => Some(&mut self.power_key),
            PowerButtonSource::PowerChip | PowerButtonSource::PowerService => None,
        }
    }
}
