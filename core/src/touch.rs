//! Touch debouncing and press/release edge detection.
//!
//! The panel is polled once per tick. Whatever the controller buffered since
//! the previous poll is drained so a stale coordinate never leaks into the
//! next decision; only the first reading of a poll is looked at.

use embedded_graphics::prelude::{Point, Size};
use log::{debug, trace, warn};

use crate::device::TouchPanel;

/// Upper bound on buffered readings consumed per poll.
pub const DRAIN_LIMIT: usize = 10;

/// One instantaneous reading of the touch controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchSample {
    pub present: bool,
    pub point: Point,
}

impl TouchSample {
    pub const NONE: TouchSample = TouchSample {
        present: false,
        point: Point::new(0, 0),
    };

    pub const fn at(x: i32, y: i32) -> Self {
        Self {
            present: true,
            point: Point::new(x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchEdge {
    NoEvent,
    PressStarted(Point),
    /// Carries the coordinate recorded when the finger went down.
    ReleaseEnded(Point),
}

/// Reads one sample from the panel and discards the rest of its buffer.
/// Driver failures read as "no touch".
pub fn read_sample(panel: Option<&mut dyn TouchPanel>) -> TouchSample {
    let Some(panel) = panel else {
        return TouchSample::NONE;
    };
    let count = match panel.sample_count() {
        Ok(count) => count,
        Err(err) => {
            warn!("Touch read error: {}", err);
            return TouchSample::NONE;
        }
    };
    if count == 0 {
        return TouchSample::NONE;
    }
    let sample = match panel.next_sample() {
        Ok(point) => TouchSample {
            present: true,
            point,
        },
        Err(err) => {
            warn!("Touch read error: {}", err);
            TouchSample::NONE
        }
    };
    drain(panel);
    trace!("Touch sample {:?} ({} buffered)", sample, count);
    sample
}

/// Empties the controller buffer.
pub fn drain(panel: &mut dyn TouchPanel) {
    for _ in 0..DRAIN_LIMIT {
        match panel.sample_count() {
            Ok(0) => break,
            Ok(_) => {
                if let Err(err) = panel.next_sample() {
                    warn!("Touch buffer clear error: {}", err);
                    break;
                }
            }
            Err(err) => {
                warn!("Touch buffer clear error: {}", err);
                break;
            }
        }
    }
}

/// Gesture state. `press_origin` is `Some` exactly while a finger is down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchGestureState {
    pub press_origin: Option<Point>,
    pub last_release_ms: Option<u64>,
}

impl TouchGestureState {
    pub fn is_pressed(&self) -> bool {
        self.press_origin.is_some()
    }
}

pub struct GestureRecognizer {
    state: TouchGestureState,
    debounce_ms: u64,
    bounds: Size,
    /// Set after a wake or resume touch: presence is ignored until the
    /// finger lifts.
    suppressed: bool,
}

impl GestureRecognizer {
    pub fn new(debounce_ms: u64, bounds: Size) -> Self {
        Self {
            state: TouchGestureState::default(),
            debounce_ms,
            bounds,
            suppressed: false,
        }
    }

    pub fn state(&self) -> &TouchGestureState {
        &self.state
    }

    pub fn is_debouncing(&self, now_ms: u64) -> bool {
        self.state
            .last_release_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.debounce_ms)
    }

    /// Polls the panel and derives at most one edge.
    pub fn poll(&mut self, now_ms: u64, panel: Option<&mut dyn TouchPanel>) -> TouchEdge {
        let sample = read_sample(panel);
        self.update(now_ms, sample)
    }

    pub fn update(&mut self, now_ms: u64, sample: TouchSample) -> TouchEdge {
        if self.is_debouncing(now_ms) {
            return TouchEdge::NoEvent;
        }

        if self.suppressed {
            if !sample.present {
                self.suppressed = false;
            }
            return TouchEdge::NoEvent;
        }

        if sample.present {
            if !self.in_bounds(sample.point) {
                trace!("Touch outside panel: {:?}", sample.point);
                return TouchEdge::NoEvent;
            }
            if self.state.press_origin.is_some() {
                return TouchEdge::NoEvent;
            }
            self.state.press_origin = Some(sample.point);
            debug!("Touch start: x={}, y={}", sample.point.x, sample.point.y);
            return TouchEdge::PressStarted(sample.point);
        }

        match self.state.press_origin.take() {
            Some(origin) => {
                debug!("Touch release: x={}, y={}", origin.x, origin.y);
                TouchEdge::ReleaseEnded(origin)
            }
            None => TouchEdge::NoEvent,
        }
    }

    /// Marks a release that activated a button, opening the debounce window.
    pub fn acknowledge_release(&mut self, now_ms: u64) {
        self.state.last_release_ms = Some(now_ms);
    }

    /// Swallows the current contact. Used when a touch wakes the device so
    /// the waking finger does not also press a key.
    pub fn suppress_until_lift(&mut self) {
        self.state.press_origin = None;
        self.suppressed = true;
    }

    pub fn reset(&mut self) {
        self.state = TouchGestureState::default();
        self.suppressed = false;
    }

    fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.bounds.width
            && (point.y as u32) < self.bounds.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use std::{collections::VecDeque, vec::Vec};

    const PANEL: Size = Size::new(540, 960);

    #[derive(Default)]
    struct ScriptedPanel {
        buffer: VecDeque<Point>,
        fail: bool,
    }

    impl ScriptedPanel {
        fn with(points: &[(i32, i32)]) -> Self {
            Self {
                buffer: points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
                fail: false,
            }
        }
    }

    impl TouchPanel for ScriptedPanel {
        fn sample_count(&mut self) -> Result<usize, DriverError> {
            if self.fail {
                return Err(DriverError::Unsupported);
            }
            Ok(self.buffer.len())
        }

        fn next_sample(&mut self) -> Result<Point, DriverError> {
            self.buffer
                .pop_front()
                .ok_or(DriverError::Failed("empty buffer"))
        }
    }

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(500, PANEL)
    }

    #[test]
    fn press_then_release_reports_origin() {
        let mut rec = recognizer();
        assert_eq!(
            rec.update(1_000, TouchSample::at(100, 200)),
            TouchEdge::PressStarted(Point::new(100, 200))
        );
        assert!(rec.state().is_pressed());
        assert_eq!(rec.update(1_100, TouchSample::at(130, 260)), TouchEdge::NoEvent);
        assert_eq!(rec.update(1_200, TouchSample::at(0, 0)), TouchEdge::NoEvent);
        assert_eq!(
            rec.update(1_300, TouchSample::NONE),
            TouchEdge::ReleaseEnded(Point::new(100, 200))
        );
        assert!(!rec.state().is_pressed());
        assert_eq!(rec.state().press_origin, None);
        assert_eq!(rec.update(1_400, TouchSample::NONE), TouchEdge::NoEvent);
    }

    #[test]
    fn noisy_buffer_is_drained_on_poll() {
        let mut rec = recognizer();
        let mut panel = ScriptedPanel::with(&[(100, 200), (0, 0), (3, 900), (7, 7)]);
        assert_eq!(
            rec.poll(1_000, Some(&mut panel)),
            TouchEdge::PressStarted(Point::new(100, 200))
        );
        assert!(panel.buffer.is_empty());
        assert_eq!(
            rec.poll(1_100, Some(&mut panel)),
            TouchEdge::ReleaseEnded(Point::new(100, 200))
        );
    }

    #[test]
    fn debounce_window_suppresses_everything() {
        let mut rec = recognizer();
        rec.update(0, TouchSample::at(10, 10));
        rec.update(50, TouchSample::NONE);
        rec.acknowledge_release(100);

        let mut panel = ScriptedPanel::with(&[(100, 200), (101, 201)]);
        assert_eq!(rec.poll(300, Some(&mut panel)), TouchEdge::NoEvent);
        assert!(panel.buffer.is_empty());
        assert_eq!(rec.poll(400, Some(&mut ScriptedPanel::default())), TouchEdge::NoEvent);
        assert!(!rec.state().is_pressed());
    }

    #[test]
    fn press_after_debounce_window_is_accepted() {
        let mut rec = recognizer();
        rec.acknowledge_release(100);
        let mut edges = Vec::new();
        let mut panel = ScriptedPanel::with(&[(100, 200), (250, 3)]);
        edges.push(rec.poll(600, Some(&mut panel)));
        let mut panel = ScriptedPanel::with(&[(0, 0)]);
        edges.push(rec.poll(700, Some(&mut panel)));
        edges.push(rec.poll(800, Some(&mut ScriptedPanel::default())));
        assert_eq!(
            edges,
            [
                TouchEdge::PressStarted(Point::new(100, 200)),
                TouchEdge::NoEvent,
                TouchEdge::ReleaseEnded(Point::new(100, 200)),
            ]
        );
    }

    #[test]
    fn unacknowledged_release_does_not_debounce() {
        let mut rec = recognizer();
        rec.update(0, TouchSample::at(10, 10));
        rec.update(50, TouchSample::NONE);
        assert_eq!(
            rec.update(60, TouchSample::at(20, 20)),
            TouchEdge::PressStarted(Point::new(20, 20))
        );
    }

    #[test]
    fn out_of_bounds_press_is_rejected() {
        let mut rec = recognizer();
        assert_eq!(rec.update(0, TouchSample::at(-1, 10)), TouchEdge::NoEvent);
        assert_eq!(rec.update(10, TouchSample::at(540, 10)), TouchEdge::NoEvent);
        assert_eq!(rec.update(20, TouchSample::at(10, 960)), TouchEdge::NoEvent);
        assert!(!rec.state().is_pressed());
    }

    #[test]
    fn out_of_bounds_sample_keeps_press() {
        let mut rec = recognizer();
        rec.update(0, TouchSample::at(10, 10));
        assert_eq!(rec.update(10, TouchSample::at(-5, -5)), TouchEdge::NoEvent);
        assert!(rec.state().is_pressed());
    }

    #[test]
    fn suppressed_contact_needs_a_lift() {
        let mut rec = recognizer();
        rec.suppress_until_lift();
        assert_eq!(rec.update(0, TouchSample::at(10, 10)), TouchEdge::NoEvent);
        assert_eq!(rec.update(10, TouchSample::at(10, 10)), TouchEdge::NoEvent);
        assert_eq!(rec.update(20, TouchSample::NONE), TouchEdge::NoEvent);
        assert_eq!(
            rec.update(30, TouchSample::at(10, 10)),
            TouchEdge::PressStarted(Point::new(10, 10))
        );
    }

    #[test]
    fn driver_failure_reads_as_no_touch() {
        let mut panel = ScriptedPanel::with(&[(1, 1)]);
        panel.fail = true;
        assert_eq!(read_sample(Some(&mut panel)), TouchSample::NONE);
        assert_eq!(read_sample(None), TouchSample::NONE);
    }
}
