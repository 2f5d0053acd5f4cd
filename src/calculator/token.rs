//! Lexical tokens produced by the tokenizer and consumed by the evaluator.

use rust_decimal::Decimal;

use super::functions::Function;

/// A binary operator in canonical form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    /// Map a canonical ASCII symbol to its operator.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }

    /// Binding strength. All operators associate to the left.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
        }
    }
}

/// Symbolic constants recognized in input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    Pi,
}

impl Constant {
    pub fn value(self) -> Decimal {
        match self {
            Self::Pi => Decimal::PI,
        }
    }
}

/// One lexical unit, in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(Decimal),
    Operator(Operator),
    Function(Function),
    LeftParen,
    RightParen,
    Constant(Constant),
}
