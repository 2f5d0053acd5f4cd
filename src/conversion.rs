//! Linear unit conversion.
//!
//! A fixed table maps every ordered pair of same-dimension units to a scale
//! factor. Converting to a larger unit divides, converting to a smaller one
//! multiplies; the derivation string shows which.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::calculator::{CalcError, Formatter};

/// A unit of length, area or volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    SquareMillimeter,
    SquareCentimeter,
    SquareMeter,
    SquareKilometer,
    CubicMillimeter,
    CubicCentimeter,
    CubicMeter,
}

const ALL_UNITS: &[Unit] = &[
    Unit::Millimeter,
    Unit::Centimeter,
    Unit::Meter,
    Unit::Kilometer,
    Unit::SquareMillimeter,
    Unit::SquareCentimeter,
    Unit::SquareMeter,
    Unit::SquareKilometer,
    Unit::CubicMillimeter,
    Unit::CubicCentimeter,
    Unit::CubicMeter,
];

impl Unit {
    /// Canonical ASCII code, used in named conversions.
    pub fn code(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::Kilometer => "km",
            Self::SquareMillimeter => "mm2",
            Self::SquareCentimeter => "cm2",
            Self::SquareMeter => "m2",
            Self::SquareKilometer => "km2",
            Self::CubicMillimeter => "mm3",
            Self::CubicCentimeter => "cm3",
            Self::CubicMeter => "m3",
        }
    }

    /// Parse a unit code. Accepts `mm2`, `mm²` and `mm^2` alike.
    pub fn parse(text: &str) -> Option<Self> {
        let code = text
            .trim()
            .to_lowercase()
            .replace('²', "2")
            .replace('³', "3")
            .replace('^', "");
        ALL_UNITS.iter().copied().find(|unit| unit.code() == code)
    }

    fn dimension(self) -> u32 {
        match self {
            Self::Millimeter | Self::Centimeter | Self::Meter | Self::Kilometer => 1,
            Self::SquareMillimeter
            | Self::SquareCentimeter
            | Self::SquareMeter
            | Self::SquareKilometer => 2,
            Self::CubicMillimeter | Self::CubicCentimeter | Self::CubicMeter => 3,
        }
    }

    /// Size of this unit in millimeters raised to its dimension.
    fn size_in_mm(self) -> u64 {
        let length: u64 = match self {
            Self::Millimeter | Self::SquareMillimeter | Self::CubicMillimeter => 1,
            Self::Centimeter | Self::SquareCentimeter | Self::CubicCentimeter => 10,
            Self::Meter | Self::SquareMeter | Self::CubicMeter => 1_000,
            Self::Kilometer | Self::SquareKilometer => 1_000_000,
        };
        length.pow(self.dimension())
    }
}

/// Whether a conversion scales up or down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Multiply,
    Divide,
}

impl Direction {
    pub fn glyph(self) -> char {
        match self {
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }
}

/// Scale applied by one table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Factor {
    pub direction: Direction,
    pub amount: Decimal,
}

impl Factor {
    fn apply(&self, value: Decimal) -> Result<Decimal, CalcError> {
        let scaled = match self.direction {
            Direction::Multiply => value.checked_mul(self.amount),
            Direction::Divide => value.checked_div(self.amount),
        };
        scaled.ok_or_else(|| CalcError::NonFiniteResult {
            reason: "converted value is out of range".to_string(),
        })
    }
}

/// The outcome of a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Converted {
    /// The converted value, formatted.
    pub result: String,
    /// `<input><×|÷><factor>=<output>`.
    pub derivation: String,
}

/// Table of registered `(from, to)` pairs.
#[derive(Clone, Debug)]
pub struct ConversionTable {
    entries: HashMap<(Unit, Unit), Factor>,
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConversionTable {
    /// Every ordered pair of distinct units sharing a dimension.
    pub fn standard() -> Self {
        let mut entries = HashMap::new();
        for &from in ALL_UNITS {
            for &to in ALL_UNITS {
                if from == to || from.dimension() != to.dimension() {
                    continue;
                }
                let (from_size, to_size) = (from.size_in_mm(), to.size_in_mm());
                let factor = if from_size >= to_size {
                    Factor {
                        direction: Direction::Multiply,
                        amount: Decimal::from(from_size / to_size),
                    }
                } else {
                    Factor {
                        direction: Direction::Divide,
                        amount: Decimal::from(to_size / from_size),
                    }
                };
                entries.insert((from, to), factor);
            }
        }
        Self { entries }
    }

    pub fn factor(&self, from: &str, to: &str) -> Result<Factor, CalcError> {
        let unsupported = || CalcError::UnsupportedConversionType {
            from: from.to_string(),
            to: to.to_string(),
        };
        let from_unit = Unit::parse(from).ok_or_else(unsupported)?;
        let to_unit = Unit::parse(to).ok_or_else(unsupported)?;
        self.entries
            .get(&(from_unit, to_unit))
            .copied()
            .ok_or_else(unsupported)
    }

    /// Convert `value` from one unit to another.
    pub fn convert(
        &self,
        value: Decimal,
        from: &str,
        to: &str,
        formatter: &Formatter,
    ) -> Result<Converted, CalcError> {
        let factor = self.factor(from, to)?;
        let output = factor.apply(value)?;
        let result = formatter.format_plain(output);
        let derivation = format!(
            "{}{}{}={}",
            formatter.format_plain(value),
            factor.direction.glyph(),
            factor.amount.normalize(),
            result
        );
        Ok(Converted { result, derivation })
    }

    /// Convert using a named entry of the form `<from>_to_<to>`.
    pub fn convert_named(
        &self,
        name: &str,
        value: Decimal,
        formatter: &Formatter,
    ) -> Result<Converted, CalcError> {
        match name.split_once("_to_") {
            Some((from, to)) => self.convert(value, from, to, formatter),
            None => Err(CalcError::UnsupportedConversionType {
                from: name.to_string(),
                to: String::new(),
            }),
        }
    }

    /// Names of all registered conversions, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut pairs: Vec<_> = self.entries.keys().copied().collect();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(from, to)| format!("{}_to_{}", from.code(), to.code()))
            .collect()
    }
}
