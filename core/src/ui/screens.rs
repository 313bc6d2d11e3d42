//! Everything the calculator puts on the panel. Each function draws into the
//! framebuffer and returns the area it touched so the caller can queue it.

extern crate alloc;

use alloc::format;

use embedded_graphics::{
    Drawable,
    mono_font::MonoTextStyle,
    pixelcolor::Gray4,
    prelude::{Point, Primitive, Size},
    primitives::{PrimitiveStyleBuilder, Rectangle, RoundedRectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use u8g2_fonts::types::{FontColor, HorizontalAlignment, VerticalPosition};

use crate::{
    calculator::CalculatorState,
    device::{BatteryLevel, MemoryStats},
    error::RenderError,
    framebuffer::{FrameBuffer, HEIGHT, WIDTH},
    keypad::{ButtonDescriptor, ButtonRegistry},
};

use super::{Rect, theme};

mod generated_icons {
    include!(concat!(env!("OUT_DIR"), "/icons.rs"));
}

mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}

pub const TITLE: &str = "PaperCalc";
pub const HEADER: Rect = Rect::new(0, 0, WIDTH as i32, 40);
pub const READOUT: Rect = Rect::new(20, 50, 500, 80);
const READOUT_RADIUS: u32 = 8;
const READOUT_TEXT_RIGHT: i32 = 480;
const BUTTON_RADIUS: u32 = 10;
const MESSAGE_X: i32 = WIDTH as i32 / 4;
const LINE: i32 = 30;

pub const FULL_SCREEN: Rect = Rect::new(0, 0, WIDTH as i32, HEIGHT as i32);

fn small_text(frame: &mut FrameBuffer, text: &str, x: i32, y: i32, color: Gray4) {
    let style = MonoTextStyle::new(theme::SMALL_FONT, color);
    Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
        .draw(frame)
        .ok();
}

fn centered_text(frame: &mut FrameBuffer, text: &str, y: i32) {
    let style = MonoTextStyle::new(theme::SMALL_FONT, theme::BLACK);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(text, Point::new(WIDTH as i32 / 2, y), style, text_style)
        .draw(frame)
        .ok();
}

fn draw_icon_mask(
    frame: &mut FrameBuffer,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    mask: &[u8],
    color: Gray4,
) {
    if width <= 0 || height <= 0 {
        return;
    }
    let width_u = width as usize;
    let height_u = height as usize;
    if mask.len() != (width_u * height_u).div_ceil(8) {
        return;
    }
    for yy in 0..height_u {
        for xx in 0..width_u {
            let idx = yy * width_u + xx;
            let bit = 7 - (idx % 8);
            if (mask[idx / 8] >> bit) & 1 == 1 {
                frame.set_pixel(x + xx as i32, y + yy as i32, color);
            }
        }
    }
}

/// Battery outline with a fill bar proportional to `percent`.
fn draw_battery(frame: &mut FrameBuffer, x: i32, y: i32, percent: Option<u8>) {
    let w = generated_icons::ICON_BATTERY_WIDTH as i32;
    let h = generated_icons::ICON_BATTERY_HEIGHT as i32;
    draw_icon_mask(
        frame,
        x,
        y,
        w,
        h,
        generated_icons::ICON_BATTERY_MASK,
        theme::BLACK,
    );
    if let Some(percent) = percent {
        let inner = w - 10;
        let filled = inner * percent.min(100) as i32 / 100;
        Rectangle::new(Point::new(x + 3, y + 4), Size::new(filled.max(0) as u32, (h - 8) as u32))
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(theme::BLACK)
                    .build(),
            )
            .draw(frame)
            .ok();
    }
}

pub fn draw_header(frame: &mut FrameBuffer, battery: Option<u8>) -> Result<Rect, RenderError> {
    HEADER
        .to_rectangle()
        .into_styled(PrimitiveStyleBuilder::new().fill_color(theme::WHITE).build())
        .draw(frame)
        .ok();
    small_text(frame, TITLE, 10, 10, theme::BLACK);

    let batt_x = WIDTH as i32 - 110;
    draw_battery(frame, batt_x - 40, 12, battery);
    if let Some(percent) = battery {
        small_text(frame, &format!("Batt: {}%", percent), batt_x, 10, theme::BLACK);
    }
    Ok(HEADER)
}

pub fn draw_readout(frame: &mut FrameBuffer, calc: &CalculatorState) -> Result<Rect, RenderError> {
    let style = PrimitiveStyleBuilder::new()
        .fill_color(theme::LIGHT_GRAY)
        .stroke_color(theme::BLACK)
        .stroke_width(1)
        .build();
    RoundedRectangle::with_equal_corners(
        READOUT.to_rectangle(),
        Size::new(READOUT_RADIUS, READOUT_RADIUS),
    )
    .into_styled(style)
    .draw(frame)
    .ok();

    let color = if calc.is_error() {
        theme::ERROR
    } else {
        theme::BLACK
    };
    let text = calc.presentation();
    theme::READOUT_FONT.render_aligned(
        text.as_str(),
        Point::new(READOUT_TEXT_RIGHT, READOUT.center().y),
        VerticalPosition::Center,
        HorizontalAlignment::Right,
        FontColor::Transparent(color),
        frame,
    )?;
    Ok(READOUT)
}

/// Draws one key. `fill` overrides the registry colour for press feedback.
pub fn draw_button(
    frame: &mut FrameBuffer,
    button: &ButtonDescriptor,
    fill: Option<Gray4>,
) -> Result<Rect, RenderError> {
    let style = PrimitiveStyleBuilder::new()
        .fill_color(fill.unwrap_or(button.fill))
        .stroke_color(theme::BLACK)
        .stroke_width(2)
        .build();
    RoundedRectangle::with_equal_corners(
        button.rect.to_rectangle(),
        Size::new(BUTTON_RADIUS, BUTTON_RADIUS),
    )
    .into_styled(style)
    .draw(frame)
    .ok();

    theme::KEY_FONT.render_aligned(
        button.label(),
        button.rect.center(),
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontColor::Transparent(theme::BLACK),
        frame,
    )?;
    Ok(button.rect)
}

pub fn draw_keypad(frame: &mut FrameBuffer, buttons: &ButtonRegistry) -> Result<Rect, RenderError> {
    for button in buttons.iter() {
        draw_button(frame, button, None)?;
    }
    Ok(buttons.bounds())
}

/// Header, readout and keypad on a cleared screen.
pub fn draw_calculator(
    frame: &mut FrameBuffer,
    calc: &CalculatorState,
    buttons: &ButtonRegistry,
    battery: Option<u8>,
) -> Result<Rect, RenderError> {
    frame.clear_screen(theme::WHITE);
    draw_header(frame, battery)?;
    draw_readout(frame, calc)?;
    draw_keypad(frame, buttons)?;
    Ok(FULL_SCREEN)
}

pub fn draw_sleep_screen(frame: &mut FrameBuffer) -> Result<Rect, RenderError> {
    frame.clear_screen(theme::WHITE);
    small_text(
        frame,
        "Touch screen to wake up",
        MESSAGE_X,
        HEIGHT as i32 / 3,
        theme::BLACK,
    );
    Ok(FULL_SCREEN)
}

pub fn draw_pause_screen(frame: &mut FrameBuffer, battery: Option<u8>) -> Result<Rect, RenderError> {
    frame.clear_screen(theme::WHITE);
    theme::TITLE_FONT.render_aligned(
        "Calculator Paused",
        Point::new(MESSAGE_X, HEIGHT as i32 / 3),
        VerticalPosition::Top,
        HorizontalAlignment::Left,
        FontColor::Transparent(theme::BLACK),
        frame,
    )?;

    let y = HEIGHT as i32 / 2;
    let lines = [
        "Application still running",
        "Touch screen to return",
        "Or long-press power button",
        "to turn off the device",
    ];
    for (idx, line) in lines.iter().enumerate() {
        small_text(frame, line, MESSAGE_X, y + idx as i32 * LINE, theme::BLACK);
    }
    if let Some(percent) = battery {
        small_text(
            frame,
            &format!("Battery: {}%", percent),
            MESSAGE_X,
            y + lines.len() as i32 * LINE + LINE,
            theme::BLACK,
        );
    }
    Ok(FULL_SCREEN)
}

/// Shown before a restart once the failure limit is exceeded. Mono text
/// only, so it cannot itself fail on a missing glyph.
pub fn draw_fatal_screen(
    frame: &mut FrameBuffer,
    kind: &str,
    message: &str,
    memory: Option<MemoryStats>,
) -> Rect {
    frame.clear_screen(theme::WHITE);
    small_text(frame, "Error occurred", 10, 10, theme::ERROR);
    small_text(frame, &format!("Type: {}", kind), 10, 40, theme::ERROR);
    small_text(frame, message, 10, 70, theme::ERROR);
    small_text(frame, "Restarting in 3 seconds...", 10, 130, theme::ERROR);
    if let Some(stats) = memory {
        small_text(
            frame,
            &format!(
                "Memory: {:.1}KB free / {:.1}KB total",
                stats.free as f32 / 1024.0,
                stats.total as f32 / 1024.0
            ),
            10,
            160,
            theme::ERROR,
        );
    }
    FULL_SCREEN
}

/// Replaces the splash when startup itself fails.
pub fn draw_startup_error(frame: &mut FrameBuffer, message: &str) -> Rect {
    frame.clear_screen(theme::WHITE);
    small_text(frame, "Startup Error", 10, 10, theme::ERROR);
    small_text(frame, message, 10, 40, theme::ERROR);
    FULL_SCREEN
}

pub fn draw_splash(frame: &mut FrameBuffer, battery: Option<u8>) -> Result<Rect, RenderError> {
    frame.clear_screen(theme::WHITE);
    if let Some(percent) = battery {
        draw_battery(frame, 10, 12, Some(percent));
        let level = BatteryLevel::from_percent(percent);
        small_text(
            frame,
            &format!("Battery: {}% ({})", percent, level.label()),
            50,
            10,
            theme::BLACK,
        );
    }

    theme::TITLE_FONT.render_aligned(
        TITLE,
        Point::new(WIDTH as i32 / 2, 200),
        VerticalPosition::Top,
        HorizontalAlignment::Center,
        FontColor::Transparent(theme::BLACK),
        frame,
    )?;
    centered_text(
        frame,
        &format!("Version {}", env!("CARGO_PKG_VERSION")),
        240,
    );
    centered_text(frame, build_info::BUILD_TIME, 270);
    centered_text(frame, "Starting...", 310);
    Ok(FULL_SCREEN)
}
