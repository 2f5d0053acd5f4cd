//! Calculator module for evaluating arithmetic expressions.
//!
//! This module provides functionality to:
//! - Normalize localized input and insert implied multiplication
//! - Detect invalid characters and unfinished input
//! - Tokenize and evaluate expressions with decimal precision
//! - Format results, recognizing multiples of π

mod detection;
mod error;
mod evaluation;
mod evaluator;
mod format;
mod functions;
mod normalize;
mod token;
mod tokenizer;

pub use detection::{Classification, classify, validate_characters};
pub use error::{CalcError, ErrorKind};
pub use evaluation::{CalcResult, Engine};
pub use evaluator::evaluate;
pub use format::{DEFAULT_DECIMAL_PLACES, Formatter};
pub use functions::{Function, FunctionTable, UnaryFn};
pub use normalize::{Normalized, PI_MARKER};
pub use token::{Constant, Operator, Token};
pub use tokenizer::tokenize;
