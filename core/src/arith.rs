extern crate alloc;

use alloc::{format, string::String};

use crate::error::ArithmeticError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ArithmeticError> {
        let result = match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => {
                if rhs == 0.0 {
                    return Err(ArithmeticError::DivideByZero);
                }
                lhs / rhs
            }
        };
        finite(result)
    }
}

pub fn square_root(value: f64) -> Result<f64, ArithmeticError> {
    if value < 0.0 {
        return Err(ArithmeticError::NegativeSquareRoot);
    }
    finite(libm::sqrt(value))
}

pub fn parse_operand(text: &str) -> Result<f64, ArithmeticError> {
    let value = text
        .parse::<f64>()
        .map_err(|_| ArithmeticError::NotANumber)?;
    if value.is_nan() {
        return Err(ArithmeticError::NotANumber);
    }
    finite(value)
}

/// Renders a result the way it is stored on the readout: shortest decimal
/// form, never with a trailing `.0`.
pub fn format_value(value: f64) -> String {
    let mut text = format!("{}", value);
    if text.ends_with(".0") {
        text.truncate(text.len() - 2);
    }
    text
}

fn finite(value: f64) -> Result<f64, ArithmeticError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArithmeticError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_each_operator() {
        assert_eq!(Operator::Add.apply(5.0, 3.0), Ok(8.0));
        assert_eq!(Operator::Subtract.apply(5.0, 3.0), Ok(2.0));
        assert_eq!(Operator::Multiply.apply(5.0, 3.0), Ok(15.0));
        assert_eq!(Operator::Divide.apply(6.0, 3.0), Ok(2.0));
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(
            Operator::Divide.apply(7.0, 0.0),
            Err(ArithmeticError::DivideByZero)
        );
        assert_eq!(
            Operator::Divide.apply(7.0, -0.0),
            Err(ArithmeticError::DivideByZero)
        );
    }

    #[test]
    fn overflow_is_an_error() {
        assert_eq!(
            Operator::Multiply.apply(f64::MAX, 10.0),
            Err(ArithmeticError::Overflow)
        );
    }

    #[test]
    fn square_root_rejects_negatives() {
        assert_eq!(square_root(9.0), Ok(3.0));
        assert_eq!(square_root(-1.0), Err(ArithmeticError::NegativeSquareRoot));
    }

    #[test]
    fn format_strips_integral_suffix() {
        assert_eq!(format_value(8.0), "8");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-3.0), "-3");
        assert_eq!(format_value(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn parse_accepts_partial_entries() {
        assert_eq!(parse_operand("0."), Ok(0.0));
        assert_eq!(parse_operand("-12.5"), Ok(-12.5));
        assert_eq!(parse_operand("Error"), Err(ArithmeticError::NotANumber));
        assert_eq!(parse_operand("inf"), Err(ArithmeticError::Overflow));
    }
}
