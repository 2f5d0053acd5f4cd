//! Display formatting for decimal results.
//!
//! Rules, in order:
//! 1. exact integers render without a decimal point
//! 2. non-zero integer multiples of π (within tolerance) render as `kπ`
//! 3. everything else is rounded to a fixed number of places, trailing zeros
//!    and a trailing point removed

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::CalcError;

/// Default number of decimal places kept by rule 3.
pub const DEFAULT_DECIMAL_PLACES: u32 = 13;

/// Formats values according to the engine configuration.
#[derive(Clone, Debug)]
pub struct Formatter {
    decimal_places: u32,
    pi_tolerance: Decimal,
    symbolic_pi: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            pi_tolerance: Decimal::new(1, 10),
            symbolic_pi: true,
        }
    }
}

impl Formatter {
    pub fn new(decimal_places: u32, pi_tolerance: Decimal, symbolic_pi: bool) -> Self {
        Self {
            decimal_places,
            pi_tolerance,
            symbolic_pi,
        }
    }

    /// Format an evaluation result, recognizing multiples of π.
    pub fn format(&self, value: Decimal) -> String {
        if let Some(integer) = as_integer(value) {
            return integer;
        }
        if self.symbolic_pi {
            if let Some(symbolic) = self.as_pi_multiple(value) {
                return symbolic;
            }
        }
        self.rounded(value)
    }

    /// Format without symbolic substitution. Used for converted quantities.
    pub fn format_plain(&self, value: Decimal) -> String {
        as_integer(value).unwrap_or_else(|| self.rounded(value))
    }

    /// Parse and format a textual value.
    pub fn format_text(&self, text: &str) -> Result<String, CalcError> {
        let trimmed = text.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| CalcError::FormatFailure {
                value: text.to_string(),
            })?;
        Ok(self.format(value))
    }

    fn as_pi_multiple(&self, value: Decimal) -> Option<String> {
        let ratio = value.checked_div(Decimal::PI)?;
        let k = ratio.round();
        if k.is_zero() || (ratio - k).abs() >= self.pi_tolerance {
            return None;
        }

        let symbolic = if k == Decimal::ONE {
            "π".to_string()
        } else if k == Decimal::NEGATIVE_ONE {
            "-π".to_string()
        } else {
            format!("{}π", k.normalize())
        };
        Some(symbolic)
    }

    fn rounded(&self, value: Decimal) -> String {
        let rounded = value
            .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        render(rounded)
    }
}

fn as_integer(value: Decimal) -> Option<String> {
    value.fract().is_zero().then(|| render(value.trunc()))
}

fn render(value: Decimal) -> String {
    if value.is_zero() {
        // never "-0"
        "0".to_string()
    } else {
        value.normalize().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::error::ErrorKind;

    fn fmt(value: Decimal) -> String {
        Formatter::default().format(value)
    }

    #[test]
    fn test_integers_have_no_point() {
        assert_eq!(fmt(Decimal::from(14)), "14");
        assert_eq!(fmt(Decimal::new(1400, 2)), "14");
        assert_eq!(fmt(Decimal::from(-3)), "-3");
        assert_eq!(fmt(Decimal::new(-0, 3)), "0");
        assert_eq!(fmt(Decimal::from(1_000_000)), "1000000");
    }

    #[test]
    fn test_decimals_are_trimmed() {
        assert_eq!(fmt(Decimal::new(15, 1)), "1.5");
        assert_eq!(fmt(Decimal::new(12500, 4)), "1.25");
        assert_eq!(fmt(Decimal::ONE / Decimal::from(3)), "0.3333333333333");
        assert_eq!(fmt(Decimal::from(2) / Decimal::from(3)), "0.6666666666667");
    }

    #[test]
    fn test_near_integers_round_to_integers() {
        let almost_one = Decimal::from_str("0.99999999999999999999").unwrap();
        assert_eq!(fmt(almost_one), "1");
        let tiny = Decimal::from_str("-0.00000000000000000001").unwrap();
        assert_eq!(fmt(tiny), "0");
    }

    #[test]
    fn test_multiples_of_pi() {
        assert_eq!(fmt(Decimal::PI), "π");
        assert_eq!(fmt(-Decimal::PI), "-π");
        assert_eq!(fmt(Decimal::PI * Decimal::from(4)), "4π");
        assert_eq!(fmt(Decimal::TWO_PI), "2π");
        // 3.14159 is too far from π to be recognized
        assert_eq!(fmt(Decimal::from_str("3.14159").unwrap()), "3.14159");
    }

    #[test]
    fn test_symbolic_pi_can_be_disabled() {
        let formatter = Formatter::new(13, Decimal::new(1, 10), false);
        assert_eq!(formatter.format(Decimal::PI), "3.1415926535898");
        assert_eq!(Formatter::default().format_plain(Decimal::PI), "3.1415926535898");
    }

    #[test]
    fn test_format_text() {
        let formatter = Formatter::default();
        assert_eq!(formatter.format_text("2.50").unwrap(), "2.5");
        assert_eq!(formatter.format_text(" 1e3 ").unwrap(), "1000");
        assert_eq!(
            formatter.format_text("abc").unwrap_err().kind(),
            ErrorKind::FormatFailure
        );
    }
}
