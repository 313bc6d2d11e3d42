use core::fmt;

/// Failure of a single calculator operation. Always shown to the user as
/// `Error` on the readout and cleared by the next entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticError {
    DivideByZero,
    NegativeSquareRoot,
    NotANumber,
    Overflow,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticError::DivideByZero => f.write_str("division by zero"),
            ArithmeticError::NegativeSquareRoot => f.write_str("square root of a negative number"),
            ArithmeticError::NotANumber => f.write_str("display does not hold a number"),
            ArithmeticError::Overflow => f.write_str("result out of range"),
        }
    }
}

/// Error reported by a hardware capability (touch, backlight, battery,
/// power button, panel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    Unsupported,
    Failed(&'static str),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Unsupported => f.write_str("not supported by this hardware"),
            DriverError::Failed(reason) => write!(f, "driver failure: {}", reason),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderError {
    GlyphNotFound(char),
    Font,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::GlyphNotFound(c) => write!(f, "glyph {:?} missing from font", c),
            RenderError::Font => f.write_str("font rendering failed"),
        }
    }
}

impl<E> From<u8g2_fonts::Error<E>> for RenderError {
    fn from(err: u8g2_fonts::Error<E>) -> Self {
        match err {
            u8g2_fonts::Error::GlyphNotFound(c) => RenderError::GlyphNotFound(c),
            _ => RenderError::Font,
        }
    }
}

/// Unexpected failure of one loop tick. Handled by the supervisor's
/// rate-limited restart policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppError {
    Display(DriverError),
    Render(RenderError),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Display(_) => "DisplayError",
            AppError::Render(_) => "RenderError",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Display(err) => write!(f, "display: {}", err),
            AppError::Render(err) => write!(f, "render: {}", err),
        }
    }
}

impl From<DriverError> for AppError {
    fn from(err: DriverError) -> Self {
        AppError::Display(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}
