//! Two-stack precedence evaluation.
//!
//! Tokens are reduced left to right with a value stack and an operator stack;
//! no syntax tree is built. All binary operators are left-associative, `^`
//! included, so `2^3^2` is `(2^3)^2`. Prefix minus binds tighter than every
//! binary operator (`-2^2` is `4`).
//!
//! A function consumes exactly the token that follows it, which must be a
//! number or a constant. `sin(30)` is rejected; `sin30` is the supported form.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::trace;

use super::error::CalcError;
use super::token::{Operator, Token};

/// An entry on the operator stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Binary(Operator),
    Negate,
    LeftParen,
}

/// Stacks for a single evaluation. Never shared between calls.
#[derive(Debug, Default)]
struct EvaluationState {
    values: Vec<Decimal>,
    pending: Vec<Pending>,
}

impl EvaluationState {
    fn pop_value(&mut self) -> Result<Decimal, CalcError> {
        self.values.pop().ok_or(CalcError::MissingOperand)
    }

    fn apply(&mut self, pending: Pending) -> Result<(), CalcError> {
        let value = match pending {
            Pending::Negate => -self.pop_value()?,
            Pending::Binary(op) => {
                let rhs = self.pop_value()?;
                let lhs = self.pop_value()?;
                apply_binary(op, lhs, rhs)?
            }
            Pending::LeftParen => return Err(CalcError::MismatchedParentheses),
        };
        self.values.push(value);
        Ok(())
    }

    /// Apply stacked operators that bind at least as tightly as `op`.
    fn reduce_for(&mut self, op: Operator) -> Result<(), CalcError> {
        while let Some(&top) = self.pending.last() {
            let should_apply = match top {
                Pending::LeftParen => false,
                Pending::Negate => true,
                Pending::Binary(stacked) => stacked.precedence() >= op.precedence(),
            };
            if !should_apply {
                break;
            }
            self.pending.pop();
            self.apply(top)?;
        }
        Ok(())
    }

    /// Apply everything back to the nearest `(` and discard it.
    fn close_group(&mut self) -> Result<(), CalcError> {
        loop {
            match self.pending.pop() {
                Some(Pending::LeftParen) => return Ok(()),
                Some(pending) => self.apply(pending)?,
                None => return Err(CalcError::MismatchedParentheses),
            }
        }
    }

    fn finish(mut self) -> Result<Decimal, CalcError> {
        while let Some(pending) = self.pending.pop() {
            self.apply(pending)?;
        }
        match self.values.as_slice() {
            [value] => Ok(*value),
            _ => Err(CalcError::MissingOperand),
        }
    }
}

/// Evaluate a token sequence to a single value.
pub fn evaluate(tokens: &[Token]) -> Result<Decimal, CalcError> {
    if tokens.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    check_balanced(tokens)?;

    let mut state = EvaluationState::default();
    let mut previous: Option<&Token> = None;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match token {
            Token::Number(n) => state.values.push(*n),
            Token::Constant(constant) => state.values.push(constant.value()),
            Token::Function(function) => {
                let argument = match tokens.get(i + 1) {
                    Some(Token::Number(n)) => *n,
                    Some(Token::Constant(constant)) => constant.value(),
                    _ => {
                        return Err(CalcError::MissingFunctionArgument {
                            function: function.name().to_string(),
                        });
                    }
                };
                let value = function.apply(argument)?;
                trace!(function = function.name(), %argument, %value, "applied function");
                state.values.push(value);
                i += 1;
            }
            Token::Operator(op) => {
                let prefix = match previous {
                    None | Some(Token::LeftParen) | Some(Token::Operator(_)) => true,
                    Some(_) => false,
                };
                if prefix {
                    match (op, previous) {
                        (Operator::Sub, _) => state.pending.push(Pending::Negate),
                        (Operator::Add, None | Some(Token::LeftParen)) => {}
                        (_, Some(Token::Operator(_))) => {
                            return Err(CalcError::ConsecutiveOperators {
                                operator: op.symbol(),
                            });
                        }
                        _ => return Err(CalcError::MissingOperand),
                    }
                } else {
                    state.reduce_for(*op)?;
                    state.pending.push(Pending::Binary(*op));
                }
            }
            Token::LeftParen => state.pending.push(Pending::LeftParen),
            Token::RightParen => state.close_group()?,
        }
        previous = Some(token);
        i += 1;
    }

    state.finish()
}

fn check_balanced(tokens: &[Token]) -> Result<(), CalcError> {
    let mut depth: usize = 0;
    for token in tokens {
        match token {
            Token::LeftParen => depth += 1,
            Token::RightParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(CalcError::MismatchedParentheses)?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(CalcError::MismatchedParentheses)
    }
}

fn apply_binary(op: Operator, lhs: Decimal, rhs: Decimal) -> Result<Decimal, CalcError> {
    match op {
        Operator::Add => lhs
            .checked_add(rhs)
            .ok_or_else(|| CalcError::overflow("addition")),
        Operator::Sub => lhs
            .checked_sub(rhs)
            .ok_or_else(|| CalcError::overflow("subtraction")),
        Operator::Mul => lhs
            .checked_mul(rhs)
            .ok_or_else(|| CalcError::overflow("multiplication")),
        Operator::Div => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            lhs.checked_div(rhs)
                .ok_or_else(|| CalcError::overflow("division"))
        }
        Operator::Pow => power(lhs, rhs),
    }
}

fn power(base: Decimal, exponent: Decimal) -> Result<Decimal, CalcError> {
    if base.is_zero() && exponent.is_sign_negative() && !exponent.is_zero() {
        return Err(CalcError::DivisionByZero);
    }

    if exponent.fract().is_zero() {
        if let Some(exp) = exponent.to_i64() {
            return base
                .checked_powi(exp)
                .ok_or_else(|| CalcError::overflow("power"));
        }
    }

    if base.is_sign_negative() && !base.is_zero() {
        return Err(CalcError::NonFiniteResult {
            reason: format!(
                "negative base {} with fractional exponent {}",
                base.normalize(),
                exponent.normalize()
            ),
        });
    }
    base.checked_powd(exponent)
        .ok_or_else(|| CalcError::overflow("power"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::error::ErrorKind;
    use crate::calculator::functions::FunctionTable;
    use crate::calculator::tokenizer::tokenize;

    fn eval(input: &str) -> Result<Decimal, CalcError> {
        let tokens = tokenize(input, &FunctionTable::standard())?;
        evaluate(&tokens)
    }

    fn kind(input: &str) -> ErrorKind {
        eval(input).unwrap_err().kind()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4").unwrap(), Decimal::from(14));
        assert_eq!(eval("(2+3)*4").unwrap(), Decimal::from(20));
        assert_eq!(eval("10-4-3").unwrap(), Decimal::from(3));
        assert_eq!(eval("2*3^2").unwrap(), Decimal::from(18));
        assert_eq!(eval("8/4/2").unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_power_is_left_associative() {
        // (2^3)^2, not 2^(3^2)
        assert_eq!(eval("2^3^2").unwrap(), Decimal::from(64));
    }

    #[test]
    fn test_power_exponents() {
        assert_eq!(eval("2^-2").unwrap(), Decimal::new(25, 2));
        assert_eq!(eval("3^0").unwrap(), Decimal::ONE);
        assert_eq!(kind("0^-1"), ErrorKind::DivisionByZero);
        assert_eq!(kind("(-8)^0.5"), ErrorKind::NonFiniteResult);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-3+5").unwrap(), Decimal::from(2));
        assert_eq!(eval("2*-3").unwrap(), Decimal::from(-6));
        assert_eq!(eval("2--3").unwrap(), Decimal::from(5));
        assert_eq!(eval("-(2+3)").unwrap(), Decimal::from(-5));
        assert_eq!(eval("-2^2").unwrap(), Decimal::from(4));
        assert_eq!(eval("+4").unwrap(), Decimal::from(4));
    }

    #[test]
    fn test_decimal_arithmetic_is_exact() {
        assert_eq!(eval("0.1+0.2").unwrap(), Decimal::new(3, 1));
        assert_eq!(eval("1.1*1.1").unwrap(), Decimal::new(121, 2));
    }

    #[test]
    fn test_functions_take_following_token() {
        let sin = eval("sin90").unwrap();
        assert!((sin - Decimal::ONE).abs() < Decimal::new(1, 15));
        let root = eval("sqrt16+1").unwrap();
        assert!((root - Decimal::from(5)).abs() < Decimal::new(1, 15));
        assert_eq!(eval("2*square3").unwrap(), Decimal::from(18));
        assert_eq!(eval("circle_areaπ").unwrap(), Decimal::PI * Decimal::PI * Decimal::PI);
    }

    #[test]
    fn test_function_argument_must_be_plain() {
        assert_eq!(kind("sin(30)"), ErrorKind::MissingFunctionArgument);
        assert_eq!(kind("sqrt"), ErrorKind::MissingFunctionArgument);
        assert_eq!(kind("sqrt-4"), ErrorKind::MissingFunctionArgument);
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(kind("(2+3"), ErrorKind::MismatchedParentheses);
        assert_eq!(kind("2+3)"), ErrorKind::MismatchedParentheses);
        assert_eq!(kind("2+)"), ErrorKind::MismatchedParentheses);
        assert_eq!(kind(")("), ErrorKind::MismatchedParentheses);
        assert_eq!(kind("((1)"), ErrorKind::MismatchedParentheses);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(kind("1/0"), ErrorKind::DivisionByZero);
        assert_eq!(kind("5/(3-3)"), ErrorKind::DivisionByZero);
        assert_eq!(kind("0/0.000"), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_operator_errors() {
        assert_eq!(kind("2+*3"), ErrorKind::ConsecutiveOperators);
        assert_eq!(kind("2*/3"), ErrorKind::ConsecutiveOperators);
        assert_eq!(kind("*3"), ErrorKind::MissingOperand);
        assert_eq!(kind("2*"), ErrorKind::MissingOperand);
        assert_eq!(kind("2 3"), ErrorKind::MissingOperand);
        assert_eq!(kind("()"), ErrorKind::MissingOperand);
    }

    #[test]
    fn test_overflow_is_non_finite() {
        assert_eq!(
            kind("79228162514264337593543950335*10"),
            ErrorKind::NonFiniteResult
        );
    }

    #[test]
    fn test_empty_token_stream() {
        assert_eq!(evaluate(&[]).unwrap_err().kind(), ErrorKind::EmptyExpression);
    }
}
