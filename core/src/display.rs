use crate::{error::DriverError, framebuffer::FrameBuffer, ui::Rect};

pub use crate::framebuffer::{HEIGHT, WIDTH};

/// Refresh modes for the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full refresh with complete waveform, clears ghosting
    Full,
    /// Partial refresh of a region without flashing
    Fast,
}

/// Panel that can show the contents of a [`FrameBuffer`].
pub trait Display {
    fn display(&mut self, frame: &FrameBuffer, mode: RefreshMode) -> Result<(), DriverError>;

    /// Pushes only `region` to the panel. Panels without partial update
    /// support refresh everything.
    fn display_region(
        &mut self,
        frame: &FrameBuffer,
        region: Rect,
        mode: RefreshMode,
    ) -> Result<(), DriverError> {
        let _ = region;
        self.display(frame, mode)
    }
}
