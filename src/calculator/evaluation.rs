//! Expression evaluation pipeline.
//!
//! normalize -> validate characters -> classify -> tokenize -> evaluate -> format
//!
//! A finished expression yields its formatted value plus a derivation line.
//! An expression still being typed (trailing operator, point or `(`) echoes
//! the input as the result and previews the value of its complete prefix as
//! the intermediate. With no complete prefix there is nothing to preview and
//! the input is an error.

use rust_decimal::Decimal;
use tracing::debug;

use super::detection::{Classification, classify, validate_characters};
use super::error::CalcError;
use super::evaluator::evaluate;
use super::format::Formatter;
use super::normalize::Normalized;
use super::tokenizer::tokenize;
use crate::config::EngineConfig;
use crate::conversion::Converted;

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcResult {
    /// Successful evaluation.
    Success {
        /// The original expression.
        expression: String,
        /// The formatted value, or the echoed input when it is incomplete.
        result: String,
        /// Derivation line, or the preview value when the input is incomplete.
        intermediate: String,
    },
    /// The expression could not be evaluated.
    Error {
        /// The original expression.
        expression: String,
        error: CalcError,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The result field, if successful.
    pub fn result(&self) -> Option<&str> {
        match self {
            Self::Success { result, .. } => Some(result),
            Self::Error { .. } => None,
        }
    }

    /// The intermediate field, if successful.
    pub fn intermediate(&self) -> Option<&str> {
        match self {
            Self::Success { intermediate, .. } => Some(intermediate),
            Self::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CalcError> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error, .. } => Some(error),
        }
    }
}

/// The evaluation engine. Holds the immutable configuration for the process.
#[derive(Clone, Debug)]
pub struct Engine {
    config: EngineConfig,
    formatter: Formatter,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        debug!(
            precision = config.precision,
            decimal_places = config.decimal_places,
            symbolic_pi = config.symbolic_pi,
            "engine configured"
        );
        let formatter = config.formatter();
        Self { config, formatter }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Evaluate one expression.
    pub fn evaluate(&self, input: &str) -> CalcResult {
        let expression = input.trim().to_string();
        match self.evaluate_inner(&expression) {
            Ok((result, intermediate)) => CalcResult::Success {
                expression,
                result,
                intermediate,
            },
            Err(error) => {
                debug!(%expression, %error, "evaluation failed");
                CalcResult::Error { expression, error }
            }
        }
    }

    /// Evaluate to a raw value, without partial-input handling.
    pub fn evaluate_value(&self, input: &str) -> Result<Decimal, CalcError> {
        let normalized = Normalized::new(input);
        if normalized.text.trim().is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        validate_characters(&normalized.text)
            .and_then(|()| self.compute(&normalized.text))
            .map_err(|error| normalized.locate(error))
    }

    /// Convert between two registered units.
    pub fn convert(&self, value: Decimal, from: &str, to: &str) -> Result<Converted, CalcError> {
        self.config
            .conversions
            .convert(value, from, to, &self.formatter)
    }

    /// Convert using a named entry such as `mm_to_m`.
    pub fn convert_named(&self, name: &str, value: Decimal) -> Result<Converted, CalcError> {
        self.config
            .conversions
            .convert_named(name, value, &self.formatter)
    }

    fn evaluate_inner(&self, expression: &str) -> Result<(String, String), CalcError> {
        if expression.is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        let normalized = Normalized::new(expression);
        self.evaluate_normalized(expression, &normalized.text)
            .map_err(|error| normalized.locate(error))
    }

    fn evaluate_normalized(
        &self,
        expression: &str,
        normalized: &str,
    ) -> Result<(String, String), CalcError> {
        if normalized.trim().is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        validate_characters(normalized)?;

        match classify(normalized) {
            Classification::Complete(complete) => {
                let value = self.compute(complete)?;
                let result = self.formatter.format(value);
                let intermediate = format!("{}={}", display_expression(complete), result);
                Ok((result, intermediate))
            }
            Classification::Partial { complete, dropped } => {
                debug!(complete, dropped, "previewing incomplete expression");
                if complete.trim().is_empty() {
                    return Err(if dropped.contains('(') {
                        CalcError::MismatchedParentheses
                    } else {
                        CalcError::EmptyExpression
                    });
                }
                let preview = self.formatter.format(self.compute(complete)?);
                Ok((expression.to_string(), preview))
            }
        }
    }

    fn compute(&self, normalized: &str) -> Result<Decimal, CalcError> {
        let tokens = tokenize(normalized, &self.config.functions)?;
        evaluate(&tokens)
    }
}

/// Render canonical text for display: no whitespace, `×` and `÷` glyphs.
fn display_expression(normalized: &str) -> String {
    normalized
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '*' => '×',
            '/' => '÷',
            c => c,
        })
        .collect()
}
