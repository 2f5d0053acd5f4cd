//! Request and response types for the line protocol.
//!
//! A request line is a bare expression, a JSON string, or a JSON object:
//!
//! ```text
//! 12+3
//! "12+3"
//! {"expression": "12+3"}
//! {"command": "convert_unit", "value": 1500, "from_unit": "mm", "to_unit": "m"}
//! {"conversion": "mm_to_m", "value": 1500}
//! {"command": "format", "value": "2.50"}
//! ```
//!
//! Every response is one JSON object, either `{"result", "intermediate"?}` or
//! `{"error"}`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::calculator::{CalcError, CalcResult};
use crate::conversion::Converted;

pub const CONVERT_UNIT: &str = "convert_unit";
pub const FORMAT: &str = "format";

/// Failures in the request itself, before any calculation.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command '{0}' is missing required fields")]
    Incomplete(String),
}

/// A decoded request line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    ConvertUnit {
        command: String,
        value: Value,
        from_unit: String,
        to_unit: String,
    },
    NamedConversion {
        conversion: String,
        value: Value,
    },
    Command {
        command: String,
        value: Value,
    },
    Expression {
        expression: String,
    },
    Bare(String),
}

impl Request {
    /// Decode one line.
    ///
    /// Lines starting with `{` or `"` must be valid JSON; anything else is
    /// taken verbatim as an expression.
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        let trimmed = line.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('"') {
            Ok(serde_json::from_str(trimmed)?)
        } else {
            Ok(Self::Bare(trimmed.to_string()))
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        result: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intermediate: Option<String>,
    },
    Failure {
        error: String,
    },
}

impl Response {
    /// Create a response from an evaluation.
    pub fn from_calc_result(result: CalcResult) -> Self {
        match result {
            CalcResult::Success {
                result,
                intermediate,
                ..
            } => Self::Success {
                result,
                intermediate: Some(intermediate),
            },
            CalcResult::Error { error, .. } => Self::failure(error),
        }
    }

    pub fn from_conversion(converted: Converted) -> Self {
        Self::Success {
            result: converted.result,
            intermediate: Some(converted.derivation),
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Read a numeric `value` field. Numbers and numeric strings are accepted.
///
/// JSON numbers keep their source text, so no digit passes through binary
/// floating point. A well-formed number too large for [`Decimal`] is a
/// non-finite result rather than a non-numeric value.
pub fn decimal_from_json(value: &Value) -> Result<Decimal, CalcError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => {
            return Err(CalcError::NonNumericValue {
                value: value.to_string(),
            });
        }
    };
    if let Ok(decimal) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        return Ok(decimal);
    }
    if serde_json::from_str::<Number>(&text).is_ok() {
        Err(CalcError::NonFiniteResult {
            reason: format!("value {text} is out of range"),
        })
    } else {
        Err(CalcError::NonNumericValue {
            value: value.to_string(),
        })
    }
}

/// The text of a `format` request's value.
pub fn text_from_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_parse_bare_expression() {
        assert_eq!(
            Request::parse("12+3").unwrap(),
            Request::Bare("12+3".to_string())
        );
        assert_eq!(
            Request::parse("\"12+3\"").unwrap(),
            Request::Bare("12+3".to_string())
        );
    }

    #[test]
    fn test_parse_expression_object() {
        assert_eq!(
            Request::parse(r#"{"expression": "2*3"}"#).unwrap(),
            Request::Expression {
                expression: "2*3".to_string()
            }
        );
    }

    #[test]
    fn test_parse_convert_unit() {
        let request = Request::parse(
            r#"{"command":"convert_unit","value":1500,"from_unit":"mm","to_unit":"m"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::ConvertUnit {
                command: CONVERT_UNIT.to_string(),
                value: json!(1500),
                from_unit: "mm".to_string(),
                to_unit: "m".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_named_conversion_and_command() {
        assert!(matches!(
            Request::parse(r#"{"conversion":"mm_to_m","value":2}"#).unwrap(),
            Request::NamedConversion { .. }
        ));
        assert!(matches!(
            Request::parse(r#"{"command":"format","value":"1.50"}"#).unwrap(),
            Request::Command { .. }
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Request::parse(r#"{"expression": "#),
            Err(RequestError::Malformed(_))
        ));
        assert!(matches!(
            Request::parse(r#"{"expression": 5}"#),
            Err(RequestError::Malformed(_))
        ));
    }

    #[test]
    fn test_response_serialization() {
        let response = Response::Success {
            result: "15".to_string(),
            intermediate: Some("12+3=15".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"result":"15","intermediate":"12+3=15"}"#
        );

        let response = Response::Success {
            result: "2.5".to_string(),
            intermediate: None,
        };
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"result":"2.5"}"#);

        let response = Response::failure(CalcError::DivisionByZero);
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"error":"division by zero"}"#
        );
    }

    #[test]
    fn test_decimal_from_json() {
        assert_eq!(decimal_from_json(&json!(1500)).unwrap(), Decimal::from(1500));
        assert_eq!(decimal_from_json(&json!(0.1)).unwrap(), Decimal::new(1, 1));
        assert_eq!(decimal_from_json(&json!(" 2.5 ")).unwrap(), Decimal::new(25, 1));
        assert_eq!(decimal_from_json(&json!("1e3")).unwrap(), Decimal::from(1000));
        let exact: Value = serde_json::from_str("1234567.890123456789").unwrap();
        assert_eq!(
            decimal_from_json(&exact).unwrap(),
            Decimal::from_str("1234567.890123456789").unwrap()
        );
        for value in [json!("abc"), json!(null), json!([1]), json!(true)] {
            assert_eq!(
                decimal_from_json(&value).unwrap_err().kind(),
                ErrorKind::NonNumericValue
            );
        }
    }

    #[test]
    fn test_out_of_range_numbers_are_not_finite() {
        let huge: Value = serde_json::from_str("1e300").unwrap();
        for value in [huge, json!("1e300"), json!("-1e40")] {
            assert_eq!(
                decimal_from_json(&value).unwrap_err().kind(),
                ErrorKind::NonFiniteResult
            );
        }
    }

    #[test]
    fn test_convert_unit_keeps_number_text() {
        let request = Request::parse(
            r#"{"command":"convert_unit","value":0.1000000000000000055511,"from_unit":"mm","to_unit":"m"}"#,
        )
        .unwrap();
        match request {
            Request::ConvertUnit { value, .. } => {
                assert_eq!(value.to_string(), "0.1000000000000000055511")
            }
            other => panic!("unexpected request {other:?}"),
        }
    }
}
