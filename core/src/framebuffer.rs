extern crate alloc;

use alloc::{vec, vec::Vec};

use embedded_graphics::{
    Pixel,
    pixelcolor::{Gray4, GrayColor},
    prelude::{Dimensions, DrawTarget, OriginDimensions, Size},
    primitives::Rectangle,
};

pub const WIDTH: usize = 540;
pub const HEIGHT: usize = 960;
/// Two 4-bit pixels per byte, high nibble first.
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT / 2;

/// Off-screen copy of the panel contents at 16 gray levels.
pub struct FrameBuffer {
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        // Clear screen to white
        Self {
            pixels: vec![0xFF; BUFFER_SIZE],
        }
    }

    pub fn clear_screen(&mut self, color: Gray4) {
        let luma = color.luma() & 0x0F;
        self.pixels.fill((luma << 4) | luma);
    }

    pub fn buffer(&self) -> &[u8] {
        &self.pixels
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Gray4) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        let index = y as usize * WIDTH + x as usize;
        let byte = &mut self.pixels[index / 2];
        let luma = color.luma() & 0x0F;
        if index % 2 == 0 {
            *byte = (*byte & 0x0F) | (luma << 4);
        } else {
            *byte = (*byte & 0xF0) | luma;
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Gray4> {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return None;
        }
        let index = y as usize * WIDTH + x as usize;
        let byte = self.pixels[index / 2];
        let luma = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        Some(Gray4::new(luma))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Gray4;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.set_pixel(coord.x, coord.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}
