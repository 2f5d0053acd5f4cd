//! Named unary functions.
//!
//! The table is built once at startup and only read afterwards. Every entry is
//! a plain function pointer over [`Decimal`], so applying one has no side
//! effects. Trigonometric functions take degrees.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::{Decimal, MathematicalOps};

use super::error::CalcError;

/// Signature shared by every library function.
pub type UnaryFn = fn(Decimal) -> Result<Decimal, CalcError>;

/// A named single-argument function.
#[derive(Clone, Copy)]
pub struct Function {
    name: &'static str,
    apply: UnaryFn,
}

impl Function {
    pub const fn new(name: &'static str, apply: UnaryFn) -> Self {
        Self { name, apply }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, argument: Decimal) -> Result<Decimal, CalcError> {
        (self.apply)(argument)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function").field(&self.name).finish()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const STANDARD_FUNCTIONS: &[Function] = &[
    Function::new("sin", sin_degrees),
    Function::new("cos", cos_degrees),
    Function::new("tan", tan_degrees),
    Function::new("sqrt", sqrt),
    Function::new("square", square),
    Function::new("circle_area", circle_area),
];

/// Lookup table from lowercase name to function.
#[derive(Clone, Debug)]
pub struct FunctionTable {
    entries: HashMap<&'static str, Function>,
}

impl FunctionTable {
    /// The fixed library: `sin`, `cos`, `tan`, `sqrt`, `square`, `circle_area`.
    pub fn standard() -> Self {
        let entries = STANDARD_FUNCTIONS
            .iter()
            .map(|function| (function.name(), *function))
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<Function> {
        self.entries.get(name).copied()
    }

    /// Function names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn half_turn() -> Decimal {
    Decimal::from(180)
}

fn full_turn() -> Decimal {
    Decimal::from(360)
}

/// Reduce to (-180, 180] and convert to radians.
fn to_radians(degrees: Decimal) -> Result<Decimal, CalcError> {
    let mut reduced = degrees
        .checked_rem(full_turn())
        .ok_or_else(|| CalcError::overflow("angle reduction"))?;
    if reduced > half_turn() {
        reduced -= full_turn();
    } else if reduced <= -half_turn() {
        reduced += full_turn();
    }
    reduced
        .checked_mul(Decimal::PI)
        .and_then(|product| product.checked_div(half_turn()))
        .ok_or_else(|| CalcError::overflow("degree conversion"))
}

fn sin_degrees(degrees: Decimal) -> Result<Decimal, CalcError> {
    to_radians(degrees)?
        .checked_sin()
        .ok_or_else(|| CalcError::overflow("sin"))
}

fn cos_degrees(degrees: Decimal) -> Result<Decimal, CalcError> {
    to_radians(degrees)?
        .checked_cos()
        .ok_or_else(|| CalcError::overflow("cos"))
}

fn right_angle() -> Decimal {
    Decimal::from(90)
}

/// Tangent in degrees.
///
/// Past 45° the result comes from the cotangent of the complement, which is
/// small enough to keep its significant digits near 90°.
fn tan_degrees(degrees: Decimal) -> Result<Decimal, CalcError> {
    let undefined = || CalcError::NonFiniteResult {
        reason: format!("tan is undefined at {}°", degrees.normalize()),
    };

    let mut reduced = degrees
        .checked_rem(half_turn())
        .ok_or_else(|| CalcError::overflow("angle reduction"))?;
    if reduced > right_angle() {
        reduced -= half_turn();
    } else if reduced <= -right_angle() {
        reduced += half_turn();
    }
    if reduced == right_angle() {
        return Err(undefined());
    }

    if reduced.abs() <= Decimal::from(45) {
        let radians = to_radians(reduced)?;
        let sin = radians
            .checked_sin()
            .ok_or_else(|| CalcError::overflow("tan"))?;
        let cos = radians
            .checked_cos()
            .ok_or_else(|| CalcError::overflow("tan"))?;
        return sin.checked_div(cos).ok_or_else(undefined);
    }

    let cotangent = cot_degrees(right_angle() - reduced.abs())?;
    Ok(if reduced.is_sign_negative() {
        -cotangent
    } else {
        cotangent
    })
}

/// Cotangent of an angle in (0°, 45°).
fn cot_degrees(degrees: Decimal) -> Result<Decimal, CalcError> {
    let overflow = || CalcError::overflow("tan");

    // Below 1e-4° the radian value has too few significant digits at 28
    // decimal places, so use cot x = 1/x - x/3 with x kept in degrees.
    if degrees < Decimal::new(1, 4) {
        let per_radian = half_turn().checked_div(Decimal::PI).ok_or_else(overflow)?;
        let inverse = per_radian.checked_div(degrees).ok_or_else(overflow)?;
        let correction = degrees
            .checked_div(per_radian * Decimal::from(3))
            .ok_or_else(overflow)?;
        return inverse.checked_sub(correction).ok_or_else(overflow);
    }

    let radians = to_radians(degrees)?;
    let sin = radians.checked_sin().ok_or_else(overflow)?;
    let cos = radians.checked_cos().ok_or_else(overflow)?;
    cos.checked_div(sin).ok_or_else(overflow)
}

fn sqrt(x: Decimal) -> Result<Decimal, CalcError> {
    if x.is_sign_negative() && !x.is_zero() {
        return Err(CalcError::NonFiniteResult {
            reason: format!("square root of negative number {}", x.normalize()),
        });
    }
    x.sqrt().ok_or_else(|| CalcError::overflow("sqrt"))
}

fn square(x: Decimal) -> Result<Decimal, CalcError> {
    x.checked_mul(x)
        .ok_or_else(|| CalcError::overflow("square"))
}

fn circle_area(radius: Decimal) -> Result<Decimal, CalcError> {
    radius
        .checked_mul(radius)
        .and_then(|squared| squared.checked_mul(Decimal::PI))
        .ok_or_else(|| CalcError::overflow("circle_area"))
}
