extern crate alloc;

use alloc::{
    format,
    string::{String, ToString},
};

use log::debug;

use crate::arith::{self, Operator};
use crate::error::ArithmeticError;

pub const ERROR_TEXT: &str = "Error";

/// Longest readout string shown as-is.
pub const PRESENTATION_WIDTH: usize = 12;

const DIGIT_LABELS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// A logical keypad key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Decimal,
    Clear,
    Backspace,
    Negate,
    SquareRoot,
    Operator(Operator),
    Equals,
}

impl Key {
    pub fn label(self) -> &'static str {
        match self {
            Key::Digit(d) => DIGIT_LABELS[(d as usize).min(9)],
            Key::Decimal => ".",
            Key::Clear => "C",
            Key::Backspace => "<",
            Key::Negate => "+/-",
            Key::SquareRoot => "rt",
            Key::Operator(op) => op.symbol(),
            Key::Equals => "=",
        }
    }

    pub fn from_label(label: &str) -> Option<Key> {
        if let Some(d) = DIGIT_LABELS.iter().position(|l| *l == label) {
            return Some(Key::Digit(d as u8));
        }
        if let Some(op) = Operator::ALL.iter().find(|op| op.symbol() == label) {
            return Some(Key::Operator(*op));
        }
        match label {
            "." => Some(Key::Decimal),
            "C" => Some(Key::Clear),
            "<" => Some(Key::Backspace),
            "+/-" => Some(Key::Negate),
            "rt" => Some(Key::SquareRoot),
            "=" => Some(Key::Equals),
            _ => None,
        }
    }

    pub fn is_operator(self) -> bool {
        matches!(self, Key::Operator(_) | Key::Equals)
    }
}

/// Running calculator-style state: one pending binary operation at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorState {
    display_text: String,
    pending_operand: f64,
    pending_operator: Option<Operator>,
    awaiting_fresh_entry: bool,
}

impl CalculatorState {
    pub fn new() -> Self {
        Self {
            display_text: "0".to_string(),
            pending_operand: 0.0,
            pending_operator: None,
            awaiting_fresh_entry: true,
        }
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn pending_operand(&self) -> f64 {
        self.pending_operand
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending_operator
    }

    pub fn awaiting_fresh_entry(&self) -> bool {
        self.awaiting_fresh_entry
    }

    pub fn is_error(&self) -> bool {
        self.display_text == ERROR_TEXT
    }

    /// Text for the readout after the 12 character presentation rule.
    pub fn presentation(&self) -> String {
        presentation_text(&self.display_text)
    }

    pub fn apply(&mut self, key: Key) {
        debug!("Key '{}' on display {:?}", key.label(), self.display_text);
        match key {
            Key::Digit(d) => self.enter_digit(DIGIT_LABELS[(d as usize).min(9)]),
            Key::Decimal => self.enter_decimal(),
            Key::Clear => *self = Self::new(),
            Key::Backspace => self.backspace(),
            Key::Negate => self.negate(),
            Key::SquareRoot => self.square_root(),
            Key::Operator(op) => self.apply_operator(Some(op)),
            Key::Equals => self.apply_operator(None),
        }
    }

    fn enter_digit(&mut self, digit: &str) {
        if self.awaiting_fresh_entry || self.display_text == "0" {
            self.display_text.clear();
            self.display_text.push_str(digit);
            self.awaiting_fresh_entry = false;
        } else {
            self.display_text.push_str(digit);
        }
    }

    fn enter_decimal(&mut self) {
        if self.awaiting_fresh_entry {
            self.display_text.clear();
            self.display_text.push_str("0.");
            self.awaiting_fresh_entry = false;
        } else if !self.display_text.contains('.') {
            self.display_text.push('.');
        }
    }

    fn backspace(&mut self) {
        if self.is_error() {
            self.reset_display();
            return;
        }
        self.display_text.pop();
        if self.display_text.is_empty() || self.display_text == "-" {
            self.reset_display();
        }
    }

    fn negate(&mut self) {
        if self.display_text == "0" || self.is_error() {
            return;
        }
        if let Some(rest) = self.display_text.strip_prefix('-') {
            self.display_text = rest.to_string();
        } else {
            self.display_text = format!("-{}", self.display_text);
        }
    }

    fn square_root(&mut self) {
        let result = arith::parse_operand(&self.display_text).and_then(arith::square_root);
        match result {
            Ok(value) => self.display_text = arith::format_value(value),
            Err(err) => self.show_error(err),
        }
        self.awaiting_fresh_entry = true;
    }

    /// Operator-apply protocol shared by the four operators and `=`.
    /// `next` is the operator left pending afterwards, `None` for `=`.
    fn apply_operator(&mut self, next: Option<Operator>) {
        let current = match arith::parse_operand(&self.display_text) {
            Ok(value) => value,
            Err(err) => {
                self.show_error(err);
                self.awaiting_fresh_entry = true;
                return;
            }
        };

        match self.pending_operator {
            Some(op) if !self.awaiting_fresh_entry => match op.apply(self.pending_operand, current) {
                Ok(result) => {
                    self.display_text = arith::format_value(result);
                    self.pending_operand = result;
                }
                Err(err) => {
                    // Abort before the pending operator is replaced.
                    self.show_error(err);
                    self.awaiting_fresh_entry = true;
                    return;
                }
            },
            _ => self.pending_operand = current,
        }

        self.pending_operator = next;
        self.awaiting_fresh_entry = true;
    }

    fn show_error(&mut self, err: ArithmeticError) {
        debug!("Arithmetic error: {}", err);
        self.display_text.clear();
        self.display_text.push_str(ERROR_TEXT);
    }

    fn reset_display(&mut self) {
        self.display_text.clear();
        self.display_text.push('0');
    }
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortens long readout strings for rendering. Stored state is untouched.
pub fn presentation_text(text: &str) -> String {
    if text.len() <= PRESENTATION_WIDTH {
        return text.to_string();
    }
    if let Ok(value) = text.parse::<f64>() {
        let magnitude = libm::fabs(value);
        if magnitude >= 1e10 || (value != 0.0 && magnitude < 1e-3) {
            return exponential(value);
        }
    }
    text.chars().take(PRESENTATION_WIDTH).collect()
}

/// Three decimals of mantissa with a signed, two digit exponent (`1.235e+10`).
fn exponential(value: f64) -> String {
    let raw = format!("{:.3e}", value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut CalculatorState, labels: &[&str]) {
        for label in labels {
            let key = Key::from_label(label).unwrap();
            state.apply(key);
        }
    }

    fn forced(text: &str) -> CalculatorState {
        let mut state = CalculatorState::new();
        state.display_text = text.to_string();
        state.awaiting_fresh_entry = false;
        state
    }

    #[test]
    fn labels_round_trip() {
        for label in [
            "0", "7", ".", "C", "<", "+/-", "rt", "+", "-", "*", "/", "=",
        ] {
            assert_eq!(Key::from_label(label).unwrap().label(), label);
        }
        assert_eq!(Key::from_label("x"), None);
    }

    #[test]
    fn digits_concatenate_without_operator() {
        let mut state = CalculatorState::new();
        let mut expected = String::new();
        for label in ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "1", "2", "3", "4"] {
            press(&mut state, &[label]);
            expected.push_str(label);
            assert_eq!(state.display_text(), expected);
        }
    }

    #[test]
    fn leading_zero_is_replaced() {
        let mut state = CalculatorState::new();
        press(&mut state, &["0", "0", "7"]);
        assert_eq!(state.display_text(), "7");
    }

    #[test]
    fn single_decimal_point() {
        let mut state = CalculatorState::new();
        press(&mut state, &["1", ".", "5", ".", "2"]);
        assert_eq!(state.display_text(), "1.52");
    }

    #[test]
    fn decimal_on_zero_keeps_zero() {
        let mut state = CalculatorState::new();
        press(&mut state, &["5", "C", ".", "5"]);
        assert_eq!(state.display_text(), "0.5");

        let mut state = forced("0");
        press(&mut state, &[".", "2"]);
        assert_eq!(state.display_text(), "0.2");
    }

    #[test]
    fn decimal_after_result_starts_new_entry() {
        let mut state = CalculatorState::new();
        press(&mut state, &["5", "/", "2", "=", ".", "5"]);
        assert_eq!(state.display_text(), "0.5");
    }

    #[test]
    fn clear_resets_from_any_state() {
        let mut state = CalculatorState::new();
        press(&mut state, &["9", "*", "4", ".", "2"]);
        press(&mut state, &["C"]);
        assert_eq!(state, CalculatorState::new());

        let mut state = CalculatorState::new();
        press(&mut state, &["7", "/", "0", "=", "C"]);
        assert_eq!(state.display_text(), "0");
        assert_eq!(state.pending_operator(), None);
        assert!(state.awaiting_fresh_entry());
        press(&mut state, &["C"]);
        assert_eq!(state, CalculatorState::new());
    }

    #[test]
    fn addition_then_equals() {
        let mut state = CalculatorState::new();
        press(&mut state, &["5", "+", "3", "="]);
        assert_eq!(state.display_text(), "8");
        assert_eq!(state.pending_operator(), None);
        assert!(state.awaiting_fresh_entry());
    }

    #[test]
    fn chained_operators_evaluate_left_to_right() {
        let mut state = CalculatorState::new();
        press(&mut state, &["2", "+", "3", "*"]);
        assert_eq!(state.display_text(), "5");
        assert_eq!(state.pending_operator(), Some(Operator::Multiply));
        press(&mut state, &["4", "="]);
        assert_eq!(state.display_text(), "20");
    }

    #[test]
    fn repeated_operator_only_replaces_pending() {
        let mut state = CalculatorState::new();
        press(&mut state, &["6", "+", "-"]);
        assert_eq!(state.display_text(), "6");
        assert_eq!(state.pending_operand(), 6.0);
        assert_eq!(state.pending_operator(), Some(Operator::Subtract));
        press(&mut state, &["2", "="]);
        assert_eq!(state.display_text(), "4");
    }

    #[test]
    fn divide_by_zero_aborts_the_transition() {
        let mut state = CalculatorState::new();
        press(&mut state, &["7", "/", "0", "="]);
        assert_eq!(state.display_text(), "Error");
        assert!(state.awaiting_fresh_entry());
        assert_eq!(state.pending_operator(), Some(Operator::Divide));
        assert_eq!(state.pending_operand(), 7.0);

        // The next digit replaces the error.
        press(&mut state, &["3"]);
        assert_eq!(state.display_text(), "3");
    }

    #[test]
    fn divide_by_zero_keeps_previous_operator_on_chain() {
        let mut state = CalculatorState::new();
        press(&mut state, &["8", "/", "0", "+"]);
        assert_eq!(state.display_text(), "Error");
        assert_eq!(state.pending_operator(), Some(Operator::Divide));
    }

    #[test]
    fn operator_on_error_stays_error() {
        let mut state = CalculatorState::new();
        press(&mut state, &["7", "/", "0", "=", "+"]);
        assert_eq!(state.display_text(), "Error");
        assert!(state.awaiting_fresh_entry());
    }

    #[test]
    fn square_root_of_perfect_square() {
        let mut state = CalculatorState::new();
        press(&mut state, &["9", "rt"]);
        assert_eq!(state.display_text(), "3");
        assert!(state.awaiting_fresh_entry());
    }

    #[test]
    fn square_root_of_forced_negative() {
        let mut state = forced("-1");
        press(&mut state, &["rt"]);
        assert_eq!(state.display_text(), "Error");
        assert!(state.awaiting_fresh_entry());
    }

    #[test]
    fn negative_reachable_through_sign_toggle() {
        let mut state = CalculatorState::new();
        press(&mut state, &["4", "+/-", "rt"]);
        assert_eq!(state.display_text(), "Error");
    }

    #[test]
    fn sign_toggle() {
        let mut state = CalculatorState::new();
        press(&mut state, &["+/-"]);
        assert_eq!(state.display_text(), "0");
        press(&mut state, &["1", "2", "+/-"]);
        assert_eq!(state.display_text(), "-12");
        press(&mut state, &["+/-"]);
        assert_eq!(state.display_text(), "12");
    }

    #[test]
    fn backspace_removes_last_character() {
        let mut state = CalculatorState::new();
        press(&mut state, &["1", "2", "3", "<"]);
        assert_eq!(state.display_text(), "12");
        press(&mut state, &["<", "<"]);
        assert_eq!(state.display_text(), "0");
        press(&mut state, &["<"]);
        assert_eq!(state.display_text(), "0");
    }

    #[test]
    fn backspace_never_leaves_a_bare_sign() {
        let mut state = CalculatorState::new();
        press(&mut state, &["5", "+/-", "<"]);
        assert_eq!(state.display_text(), "0");
    }

    #[test]
    fn backspace_clears_error() {
        let mut state = CalculatorState::new();
        press(&mut state, &["1", "/", "0", "=", "<"]);
        assert_eq!(state.display_text(), "0");
    }

    #[test]
    fn fractional_results() {
        let mut state = CalculatorState::new();
        press(&mut state, &["1", "/", "4", "="]);
        assert_eq!(state.display_text(), "0.25");
        press(&mut state, &["2", "rt"]);
        assert_eq!(state.display_text(), "1.4142135623730951");
    }

    #[test]
    fn presentation_leaves_short_text_alone() {
        assert_eq!(presentation_text("123456789012"), "123456789012");
        assert_eq!(presentation_text("Error"), "Error");
    }

    #[test]
    fn presentation_truncates_mid_range_values() {
        assert_eq!(presentation_text("1.4142135623730951"), "1.4142135623");
        assert_eq!(presentation_text("0.3333333333333333"), "0.3333333333");
    }

    #[test]
    fn presentation_uses_exponent_for_extremes() {
        assert_eq!(presentation_text("12345678901234"), "1.235e+13");
        assert_eq!(presentation_text("-12345678901234"), "-1.235e+13");
        assert_eq!(presentation_text("0.0000123456789"), "1.235e-05");
    }

    #[test]
    fn presentation_does_not_touch_state() {
        let mut state = CalculatorState::new();
        press(&mut state, &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "1", "2", "3"]);
        assert_eq!(state.display_text(), "1234567890123");
        assert_eq!(state.presentation(), "1.235e+12");
    }
}
