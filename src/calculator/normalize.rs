//! Input normalization.
//!
//! Maps localized glyphs (full-width digits and operators, `×`, `÷`, the
//! Unicode minus) onto canonical ASCII, drops anything after `=`, and inserts
//! `*` wherever multiplication is implied by adjacency:
//!
//! - before `π` following a digit, `)` or `π`
//! - before `(` following a digit, `)` or `π`
//! - before a function name following a digit, `)` or `π`

use super::error::CalcError;

/// Canonical marker for the constant π.
pub const PI_MARKER: char = 'π';

/// Canonical text together with where each of its characters came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// Raw character index for each character of `text`. An inserted `*`
    /// points at the character it was inserted before.
    origins: Vec<usize>,
}

impl Normalized {
    /// Normalize a raw expression into canonical form.
    pub fn new(raw: &str) -> Self {
        let source = raw.split(['=', '＝']).next().unwrap_or_default();

        let mut out = Output::with_capacity(source.len() + 8);
        for (index, c) in source.chars().enumerate() {
            match canonical(c) {
                Canonical::Char(c) => out.push(c, index),
                Canonical::Squared => {
                    out.push('^', index);
                    out.push('2', index);
                }
            }
        }
        Self {
            text: out.text,
            origins: out.origins,
        }
    }

    /// Raw character index behind the normalized character at `position`.
    pub fn origin(&self, position: usize) -> usize {
        match self.origins.get(position) {
            Some(&index) => index,
            None => self.origins.last().map_or(0, |&index| index + 1),
        }
    }

    /// Rewrite an error's character position to point into the raw input.
    pub fn locate(&self, error: CalcError) -> CalcError {
        match error {
            CalcError::InvalidCharacter { ch, position } => CalcError::InvalidCharacter {
                ch,
                position: self.origin(position),
            },
            other => other,
        }
    }
}

struct Output {
    text: String,
    origins: Vec<usize>,
    last: Option<char>,
    last_significant: Option<char>,
}

impl Output {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            origins: Vec::with_capacity(capacity),
            last: None,
            last_significant: None,
        }
    }

    fn push(&mut self, c: char, origin: usize) {
        let starts_word = is_word_char(c) && !self.last.is_some_and(is_word_char);
        let needs_mul = (c == PI_MARKER || c == '(' || starts_word)
            && self.last_significant.is_some_and(ends_operand);

        if needs_mul {
            self.text.push('*');
            self.origins.push(origin);
        }
        self.text.push(c);
        self.origins.push(origin);
        self.last = Some(c);
        if !c.is_whitespace() {
            self.last_significant = Some(c);
        }
    }
}

enum Canonical {
    Char(char),
    Squared,
}

fn canonical(c: char) -> Canonical {
    let mapped = match c {
        '×' | '✕' | '＊' | '·' | '・' => '*',
        '÷' | '／' => '/',
        '－' | '−' => '-',
        '＋' => '+',
        '（' => '(',
        '）' => ')',
        '＾' => '^',
        '．' => '.',
        '０'..='９' => {
            let offset = c as u32 - '０' as u32;
            char::from_digit(offset, 10).unwrap_or(c)
        }
        '²' => return Canonical::Squared,
        c if c.is_whitespace() => ' ',
        c => c,
    };
    Canonical::Char(mapped)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn ends_operand(c: char) -> bool {
    c.is_ascii_digit() || c == ')' || c == PI_MARKER
}
