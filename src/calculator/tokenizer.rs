//! Lexer for canonical expression text.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::CalcError;
use super::functions::FunctionTable;
use super::normalize::PI_MARKER;
use super::token::{Constant, Operator, Token};

/// Tokenize normalized input.
///
/// Supports:
/// - decimal numbers (`12`, `1.5`, `.5`, `3.`)
/// - operators `+ - * / ^` and parentheses
/// - `π` and `pi`
/// - function names from `functions`, case-insensitive
///
/// Whitespace only separates tokens.
pub fn tokenize(input: &str, functions: &FunctionTable) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            let mut seen_point = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                if chars[i] == '.' {
                    if seen_point {
                        return Err(CalcError::InvalidCharacter {
                            ch: '.',
                            position: i,
                        });
                    }
                    seen_point = true;
                }
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            tokens.push(Token::Number(parse_number(&literal, start)?));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '_') {
                i += 1;
            }
            let word = chars[start..i].iter().collect::<String>().to_lowercase();
            if word == "pi" {
                tokens.push(Token::Constant(Constant::Pi));
            } else if let Some(function) = functions.get(&word) {
                tokens.push(Token::Function(function));
            } else {
                return Err(CalcError::UnknownFunction { name: word });
            }
            continue;
        }

        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            PI_MARKER => Token::Constant(Constant::Pi),
            c => match Operator::from_symbol(c) {
                Some(op) => Token::Operator(op),
                None => return Err(CalcError::InvalidCharacter { ch: c, position: i }),
            },
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

fn parse_number(literal: &str, position: usize) -> Result<Decimal, CalcError> {
    let digits = literal.trim_end_matches('.');
    if digits.is_empty() {
        return Err(CalcError::InvalidCharacter { ch: '.', position });
    }

    let text = if digits.starts_with('.') {
        format!("0{digits}")
    } else {
        digits.to_string()
    };

    Decimal::from_str(&text).map_err(|_| CalcError::NonFiniteResult {
        reason: format!("number {literal} is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::error::ErrorKind;

    fn lex(input: &str) -> Result<Vec<Token>, CalcError> {
        tokenize(input, &FunctionTable::standard())
    }

    fn num(n: i64) -> Token {
        Token::Number(Decimal::from(n))
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            lex("12+3*4").unwrap(),
            vec![
                num(12),
                Token::Operator(Operator::Add),
                num(3),
                Token::Operator(Operator::Mul),
                num(4),
            ]
        );
    }

    #[test]
    fn test_decimal_literals() {
        assert_eq!(lex("1.5").unwrap(), vec![Token::Number(Decimal::new(15, 1))]);
        assert_eq!(lex(".5").unwrap(), vec![Token::Number(Decimal::new(5, 1))]);
        assert_eq!(lex("3.").unwrap(), vec![num(3)]);
    }

    #[test]
    fn test_whitespace_separates() {
        assert_eq!(lex(" 2  3 ").unwrap(), vec![num(2), num(3)]);
    }

    #[test]
    fn test_functions_and_constants() {
        let table = FunctionTable::standard();
        assert_eq!(
            lex("SIN30").unwrap(),
            vec![Token::Function(table.get("sin").unwrap()), num(30)]
        );
        assert_eq!(
            lex("2*pi").unwrap(),
            vec![
                num(2),
                Token::Operator(Operator::Mul),
                Token::Constant(Constant::Pi)
            ]
        );
        assert_eq!(lex("π").unwrap(), vec![Token::Constant(Constant::Pi)]);
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            lex("(1)").unwrap(),
            vec![Token::LeftParen, num(1), Token::RightParen]
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = lex("log10").unwrap_err();
        assert_eq!(
            err,
            CalcError::UnknownFunction {
                name: "log".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(lex("2#3").unwrap_err().kind(), ErrorKind::InvalidCharacter);
        assert_eq!(lex("1.2.3").unwrap_err().kind(), ErrorKind::InvalidCharacter);
        assert_eq!(lex(".").unwrap_err().kind(), ErrorKind::InvalidCharacter);
    }
}
