//! Error taxonomy for expression evaluation and unit conversion.
//!
//! Every failure the engine can report is a [`CalcError`]. The worker surfaces
//! the `Display` text as the `"error"` field of a response; [`ErrorKind`] is
//! the fieldless discriminant used for matching.

use thiserror::Error;

/// Any failure produced while evaluating an expression or converting a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// The input was empty, whitespace only, or nothing remained before `=`.
    #[error("expression is empty")]
    EmptyExpression,

    /// A character outside the allowed set. `position` counts characters of
    /// the expression as typed.
    #[error("invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// An alphabetic run that names no known function or constant.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    /// A binary operator directly followed another operator.
    #[error("operator '{operator}' follows another operator")]
    ConsecutiveOperators { operator: char },

    #[error("missing operand")]
    MissingOperand,

    /// A function name not followed by a plain number or constant.
    #[error("function '{function}' requires a numeric argument")]
    MissingFunctionArgument { function: String },

    #[error("division by zero")]
    DivisionByZero,

    /// Overflow, or a value with no finite decimal result.
    #[error("result is not a finite number: {reason}")]
    NonFiniteResult { reason: String },

    #[error("cannot format '{value}' as a number")]
    FormatFailure { value: String },

    #[error("unsupported conversion: {from} to {to}")]
    UnsupportedConversionType { from: String, to: String },

    #[error("value '{value}' is not numeric")]
    NonNumericValue { value: String },
}

/// Discriminant of a [`CalcError`], without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyExpression,
    InvalidCharacter,
    UnknownFunction,
    MismatchedParentheses,
    ConsecutiveOperators,
    MissingOperand,
    MissingFunctionArgument,
    DivisionByZero,
    NonFiniteResult,
    FormatFailure,
    UnsupportedConversionType,
    NonNumericValue,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyExpression => "EmptyExpression",
            Self::InvalidCharacter => "InvalidCharacter",
            Self::UnknownFunction => "UnknownFunction",
            Self::MismatchedParentheses => "MismatchedParentheses",
            Self::ConsecutiveOperators => "ConsecutiveOperators",
            Self::MissingOperand => "MissingOperand",
            Self::MissingFunctionArgument => "MissingFunctionArgument",
            Self::DivisionByZero => "DivisionByZero",
            Self::NonFiniteResult => "NonFiniteResult",
            Self::FormatFailure => "FormatFailure",
            Self::UnsupportedConversionType => "UnsupportedConversionType",
            Self::NonNumericValue => "NonNumericValue",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CalcError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyExpression => ErrorKind::EmptyExpression,
            Self::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
            Self::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            Self::MismatchedParentheses => ErrorKind::MismatchedParentheses,
            Self::ConsecutiveOperators { .. } => ErrorKind::ConsecutiveOperators,
            Self::MissingOperand => ErrorKind::MissingOperand,
            Self::MissingFunctionArgument { .. } => ErrorKind::MissingFunctionArgument,
            Self::DivisionByZero => ErrorKind::DivisionByZero,
            Self::NonFiniteResult { .. } => ErrorKind::NonFiniteResult,
            Self::FormatFailure { .. } => ErrorKind::FormatFailure,
            Self::UnsupportedConversionType { .. } => ErrorKind::UnsupportedConversionType,
            Self::NonNumericValue { .. } => ErrorKind::NonNumericValue,
        }
    }

    pub(crate) fn overflow(operation: &str) -> Self {
        Self::NonFiniteResult {
            reason: format!("{operation} overflowed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = CalcError::InvalidCharacter {
            ch: '$',
            position: 3,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidCharacter);
        assert_eq!(err.kind().as_str(), "InvalidCharacter");
        assert_eq!(CalcError::DivisionByZero.kind(), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = CalcError::UnknownFunction {
            name: "log".to_string(),
        };
        assert_eq!(err.to_string(), "unknown function 'log'");

        let err = CalcError::UnsupportedConversionType {
            from: "mm".to_string(),
            to: "kg".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported conversion: mm to kg");
        assert!(CalcError::overflow("multiplication")
            .to_string()
            .contains("multiplication overflowed"));
    }

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_error_is_send_sync_static() {
        _assert_send_sync_static::<CalcError>();
    }
}
