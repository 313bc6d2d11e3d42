use embedded_graphics::{mono_font::{MonoFont, ascii::FONT_10X20}, pixelcolor::Gray4};
use u8g2_fonts::{FontRenderer, fonts};

/// Maps a 24-bit RGB colour to the nearest of the panel's 16 gray levels
/// by luminance.
pub const fn gray(rgb: u32) -> Gray4 {
    let r = (rgb >> 16) & 0xFF;
    let g = (rgb >> 8) & 0xFF;
    let b = rgb & 0xFF;
    let luma = (r * 299 + g * 587 + b * 114) / 1000;
    Gray4::new(((luma + 8) / 17) as u8)
}

pub const BLACK: Gray4 = gray(0x000000);
pub const WHITE: Gray4 = gray(0xFFFFFF);
pub const GRAY: Gray4 = gray(0xCCCCCC);
pub const LIGHT_GRAY: Gray4 = gray(0xDDDDDD);
pub const ORANGE: Gray4 = gray(0xFFA500);
pub const HIGHLIGHT_ORANGE: Gray4 = gray(0xFFBB55);
pub const HIGHLIGHT_GRAY: Gray4 = gray(0xDDDDDD);
/// Error text is red on colour panels; the darkest shade here.
pub const ERROR: Gray4 = gray(0x000000);

pub const SMALL_FONT: &MonoFont<'static> = &FONT_10X20;
pub const KEY_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB24_tf>();
pub const READOUT_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_logisoso32_tf>();
pub const TITLE_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB18_tf>();

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::GrayColor;

    #[test]
    fn palette_keeps_ordering() {
        assert_eq!(BLACK.luma(), 0);
        assert_eq!(WHITE.luma(), 15);
        assert!(ORANGE.luma() < GRAY.luma());
        assert!(GRAY.luma() <= LIGHT_GRAY.luma());
        assert!(ORANGE.luma() < HIGHLIGHT_ORANGE.luma());
    }
}
