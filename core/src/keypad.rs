extern crate alloc;

use alloc::vec::Vec;

use embedded_graphics::{pixelcolor::Gray4, prelude::Point};

use crate::{
    calculator::Key,
    ui::{Rect, theme},
};

pub const BUTTON_WIDTH: i32 = 110;
pub const BUTTON_HEIGHT: i32 = 100;
pub const BUTTON_GAP: i32 = 10;
pub const KEYPAD_X: i32 = 15;
pub const KEYPAD_Y: i32 = 160;

/// Row-major keypad layout.
pub const LAYOUT: [[&str; 4]; 5] = [
    ["7", "8", "9", "/"],
    ["4", "5", "6", "*"],
    ["1", "2", "3", "-"],
    ["0", ".", "=", "+"],
    ["C", "+/-", "<", "rt"],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonDescriptor {
    pub key: Key,
    pub rect: Rect,
    pub fill: Gray4,
}

impl ButtonDescriptor {
    pub fn label(&self) -> &'static str {
        self.key.label()
    }

    /// Shade used for the short press feedback.
    pub fn highlight_fill(&self) -> Gray4 {
        if self.key.is_operator() {
            theme::HIGHLIGHT_ORANGE
        } else {
            theme::HIGHLIGHT_GRAY
        }
    }
}

/// Buttons in insertion order. Built once at layout time.
pub struct ButtonRegistry {
    buttons: Vec<ButtonDescriptor>,
}

impl ButtonRegistry {
    pub fn new() -> Self {
        Self {
            buttons: Vec::new(),
        }
    }

    /// The calculator's 5x4 keypad.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (row_idx, row) in LAYOUT.iter().enumerate() {
            let y = KEYPAD_Y + row_idx as i32 * (BUTTON_HEIGHT + BUTTON_GAP);
            for (col_idx, label) in row.iter().enumerate() {
                let x = KEYPAD_X + col_idx as i32 * (BUTTON_WIDTH + BUTTON_GAP);
                let Some(key) = Key::from_label(label) else {
                    continue;
                };
                registry.insert(key, Rect::new(x, y, BUTTON_WIDTH, BUTTON_HEIGHT));
            }
        }
        registry
    }

    /// Adds a button; a key already present keeps its first registration.
    pub fn insert(&mut self, key: Key, rect: Rect) {
        if self.get(key).is_some() {
            return;
        }
        self.buttons.push(ButtonDescriptor {
            key,
            rect,
            fill: fill_for(key),
        });
    }

    pub fn get(&self, key: Key) -> Option<&ButtonDescriptor> {
        self.buttons.iter().find(|b| b.key == key)
    }

    pub fn find(&self, label: &str) -> Option<&ButtonDescriptor> {
        self.buttons.iter().find(|b| b.label() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonDescriptor> {
        self.buttons.iter()
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// First button whose rectangle contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<Key> {
        self.buttons
            .iter()
            .find(|b| b.rect.contains(point))
            .map(|b| b.key)
    }

    /// Smallest rectangle covering every button.
    pub fn bounds(&self) -> Rect {
        self.buttons
            .iter()
            .fold(Rect::new(0, 0, 0, 0), |acc, b| acc.union(&b.rect))
    }
}

impl Default for ButtonRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn fill_for(key: Key) -> Gray4 {
    match key {
        Key::Digit(_) | Key::Decimal => theme::WHITE,
        Key::Operator(_) | Key::Equals => theme::ORANGE,
        _ => theme::GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Operator;

    #[test]
    fn standard_layout_has_twenty_keys() {
        let registry = ButtonRegistry::standard();
        assert_eq!(registry.len(), 20);
        let first = registry.iter().next().unwrap();
        assert_eq!(first.label(), "7");
        assert_eq!(first.rect, Rect::new(15, 160, 110, 100));
        let rt = registry.find("rt").unwrap();
        assert_eq!(rt.rect, Rect::new(375, 600, 110, 100));
    }

    #[test]
    fn hit_test_finds_buttons() {
        let registry = ButtonRegistry::standard();
        assert_eq!(registry.hit_test(Point::new(20, 170)), Some(Key::Digit(7)));
        assert_eq!(registry.hit_test(Point::new(100, 200)), Some(Key::Digit(7)));
        assert_eq!(
            registry.hit_test(Point::new(400, 170)),
            Some(Key::Operator(Operator::Divide))
        );
        assert_eq!(registry.hit_test(Point::new(260, 520)), Some(Key::Equals));
        assert_eq!(registry.hit_test(Point::new(484, 699)), Some(Key::SquareRoot));
    }

    #[test]
    fn gaps_and_edges_miss() {
        let registry = ButtonRegistry::standard();
        // Gap between the first two columns.
        assert_eq!(registry.hit_test(Point::new(130, 200)), None);
        // Right and bottom edges are exclusive.
        assert_eq!(registry.hit_test(Point::new(125, 200)), None);
        assert_eq!(registry.hit_test(Point::new(50, 260)), None);
        // Readout area.
        assert_eq!(registry.hit_test(Point::new(200, 80)), None);
        assert_eq!(registry.hit_test(Point::new(-1, -1)), None);
    }

    #[test]
    fn overlapping_rectangles_first_match_wins() {
        let mut registry = ButtonRegistry::new();
        registry.insert(Key::Digit(1), Rect::new(0, 0, 100, 100));
        registry.insert(Key::Digit(2), Rect::new(50, 50, 100, 100));
        assert_eq!(registry.hit_test(Point::new(75, 75)), Some(Key::Digit(1)));
        assert_eq!(registry.hit_test(Point::new(120, 120)), Some(Key::Digit(2)));
    }

    #[test]
    fn fills_follow_key_category() {
        let registry = ButtonRegistry::standard();
        assert_eq!(registry.find("5").unwrap().fill, theme::WHITE);
        assert_eq!(registry.find("=").unwrap().fill, theme::ORANGE);
        assert_eq!(registry.find("C").unwrap().fill, theme::GRAY);
        assert_eq!(
            registry.find("+").unwrap().highlight_fill(),
            theme::HIGHLIGHT_ORANGE
        );
    }

    #[test]
    fn bounds_cover_keypad() {
        let registry = ButtonRegistry::standard();
        assert_eq!(registry.bounds(), Rect::new(15, 160, 470, 540));
    }
}
