extern crate alloc;

use alloc::vec::Vec;

use crate::{
    display::{Display, RefreshMode},
    error::DriverError,
    framebuffer::{FrameBuffer, HEIGHT, WIDTH},
};

use super::geom::Rect;

/// Regions drawn into the framebuffer that still have to reach the panel.
#[derive(Default)]
pub struct RenderQueue {
    items: Vec<(Rect, RefreshMode)>,
}

impl RenderQueue {
    pub fn push(&mut self, rect: Rect, mode: RefreshMode) {
        let rect = rect.clamp_to(WIDTH as i32, HEIGHT as i32);
        if rect.is_empty() {
            return;
        }
        if let Some(existing) = self.items.iter_mut().find(|(r, _)| *r == rect) {
            if mode == RefreshMode::Full {
                existing.1 = RefreshMode::Full;
            }
            return;
        }
        self.items.push((rect, mode));
    }

    pub fn push_full(&mut self) {
        self.push(Rect::new(0, 0, WIDTH as i32, HEIGHT as i32), RefreshMode::Full);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn covers_screen(&self) -> bool {
        self.items
            .iter()
            .any(|(r, _)| *r == Rect::new(0, 0, WIDTH as i32, HEIGHT as i32))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Sends queued regions to the panel and empties the queue. A full-screen
/// entry collapses everything into one full refresh.
pub fn flush_queue(
    display: &mut impl Display,
    frame: &FrameBuffer,
    rq: &mut RenderQueue,
) -> Result<(), DriverError> {
    if rq.is_empty() {
        return Ok(());
    }
    if rq.covers_screen() {
        rq.clear();
        return display.display(frame, RefreshMode::Full);
    }
    for (rect, mode) in rq.items.drain(..) {
        display.display_region(frame, rect, mode)?;
    }
    Ok(())
}
