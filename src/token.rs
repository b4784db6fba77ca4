use std::fmt;
use std::iter::Peekable;

use crate::error::CalcError;
use crate::error::CalcError::*;
use crate::value::Value;

/// Tokens used for parsing an arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Plus,
    Minus,
    Divide,
    Multiply,
    Exponent,
    Square,
    Cube,
    Modulo,
    OpenParen,
    CloseParen,
    Comma,
    Number(Value),
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Plus => write!(f, "Plus"),
            Token::Minus => write!(f, "Minus"),
            Token::Divide => write!(f, "Divide"),
            Token::Multiply => write!(f, "Multiply"),
            Token::Exponent => write!(f, "Exponent"),
            Token::Square => write!(f, "Square"),
            Token::Cube => write!(f, "Cube"),
            Token::Modulo => write!(f, "Modulo"),
            Token::OpenParen => write!(f, "OpenParen"),
            Token::CloseParen => write!(f, "CloseParen"),
            Token::Comma => write!(f, "Comma"),
            Token::Number(ref n) => write!(f, "'{}'", n),
            Token::Atom(ref s) => write!(f, "'{}'", s),
        }
    }
}

enum OperatorState {
    PotentiallyIncomplete,
    Complete,
    NotAnOperator,
}

trait IsOperator {
    fn is_operator(self) -> bool;
}

impl IsOperator for char {
    fn is_operator(self) -> bool {
        match self {
            '+' | '-' | '/' | '^' | '²' | '³' | '%' | '(' | ')' | '*' | ',' => true,
            _ => false,
        }
    }
}

trait CheckOperator {
    fn check_operator(self) -> OperatorState;
}

impl CheckOperator for char {
    fn check_operator(self) -> OperatorState {
        match self {
            '+' | '-' | '/' | '^' | '²' | '³' | '%' | '(' | ')' | ',' => {
                OperatorState::Complete
            }
            '*' => OperatorState::PotentiallyIncomplete,
            _ => OperatorState::NotAnOperator,
        }
    }
}

trait OperatorMatch {
    fn operator_type(self) -> Option<Token>;
}

impl OperatorMatch for [char; 2] {
    fn operator_type(self) -> Option<Token> {
        if self == ['*', '*'] {
            Some(Token::Exponent)
        } else {
            None
        }
    }
}

impl OperatorMatch for char {
    fn operator_type(self) -> Option<Token> {
        match self {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '/' => Some(Token::Divide),
            '*' => Some(Token::Multiply),
            '^' => Some(Token::Exponent),
            '²' => Some(Token::Square),
            '³' => Some(Token::Cube),
            '%' => Some(Token::Modulo),
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            ',' => Some(Token::Comma),
            _ => None,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_alphabetic() {
            tokens.push(Token::Atom(consume_atom(&mut chars)));
        } else if c.is_digit(10) || c == '.' {
            tokens.push(consume_number(&mut chars)?);
        } else {
            match c.check_operator() {
                OperatorState::Complete => {
                    tokens.push(c.operator_type().ok_or(InvalidOperator(c))?);
                    chars.next();
                }
                OperatorState::PotentiallyIncomplete => {
                    chars.next();
                    match chars.peek() {
                        Some(&next_char) if next_char == c => {
                            tokens.push(
                                [c, next_char]
                                    .operator_type()
                                    .ok_or(InvalidOperator(c))?,
                            );
                            chars.next();
                        }
                        _ => {
                            tokens.push(c.operator_type().ok_or(InvalidOperator(c))?);
                        }
                    }
                }
                OperatorState::NotAnOperator => {
                    if c.is_whitespace() {
                        chars.next();
                    } else {
                        let token_string = consume_until_new_token(&mut chars);
                        return Err(CalcError::UnrecognizedToken(token_string));
                    }
                }
            }
        }
    }
    tracing::trace!(?tokens, "tokenized {:?}", input);
    Ok(tokens)
}

fn digits<I>(input: &mut Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut number = String::new();
    while let Some(&c) = input.peek() {
        if c.is_digit(10) {
            number.push(c);
        } else {
            break;
        }
        input.next();
    }
    number
}

/// Consume a decimal literal: `12`, `.5`, `3.`, `2.5e-3`.
///
/// The exponent marker is only taken when digits follow it, so `2e` lexes
/// as the number `2` followed by the atom `e`.
fn consume_number<I>(input: &mut Peekable<I>) -> Result<Token, CalcError>
where
    I: Iterator<Item = char> + Clone,
{
    let mut literal = digits(input);
    if let Some(&'.') = input.peek() {
        input.next();
        literal.push('.');
        literal.push_str(&digits(input));
    }
    if let Some(&marker) = input.peek() {
        if marker == 'e' || marker == 'E' {
            let mut lookahead = input.clone();
            lookahead.next();
            let sign = match lookahead.peek() {
                Some(&s) if s == '+' || s == '-' => {
                    lookahead.next();
                    Some(s)
                }
                _ => None,
            };
            if lookahead.peek().map_or(false, |c| c.is_digit(10)) {
                *input = lookahead;
                literal.push('e');
                if let Some(s) = sign {
                    literal.push(s);
                }
                literal.push_str(&digits(input));
            }
        }
    }
    if literal == "." {
        return Err(CalcError::InvalidNumber(literal));
    }
    Ok(Token::Number(Value::new(literal.parse()?)))
}

/// Consume a valid atom. An atom is defined by:
/// - Starting with an alphabetic character
/// - Consisting of alphanumeric characters or underscores
fn consume_atom<I: Iterator<Item = char>>(input: &mut Peekable<I>) -> String {
    let mut atom = String::new();
    while let Some(&c) = input.peek() {
        if c.is_alphanumeric() || c == '_' {
            atom.push(c);
            input.next();
        } else {
            break;
        }
    }
    atom
}

fn consume_until_new_token<I: Iterator<Item = char>>(input: &mut I) -> String {
    input
        .take_while(|c| !(c.is_whitespace() || c.is_operator() || c.is_digit(10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Token {
        Token::Number(Value::new(n))
    }

    #[test]
    fn normal() {
        let line = "(3 + 7) ** 10 * (7 % 2)";
        let expected = vec![
            Token::OpenParen,
            num(3.0),
            Token::Plus,
            num(7.0),
            Token::CloseParen,
            Token::Exponent,
            num(10.0),
            Token::Multiply,
            Token::OpenParen,
            num(7.0),
            Token::Modulo,
            num(2.0),
            Token::CloseParen,
        ];
        assert_eq!(tokenize(line), Ok(expected));
    }

    #[test]
    fn function_call() {
        let line = "pow(2, 0.5) / log2(8)";
        let expected = vec![
            Token::Atom("pow".into()),
            Token::OpenParen,
            num(2.0),
            Token::Comma,
            num(0.5),
            Token::CloseParen,
            Token::Divide,
            Token::Atom("log2".into()),
            Token::OpenParen,
            num(8.0),
            Token::CloseParen,
        ];
        assert_eq!(tokenize(line), Ok(expected));
    }

    #[test]
    fn number_forms() {
        let cases = vec![
            (".5", vec![num(0.5)]),
            ("3.", vec![num(3.0)]),
            ("2.5e-3", vec![num(0.0025)]),
            ("1E3", vec![num(1000.0)]),
            ("1e+21", vec![num(1e21)]),
            ("2e", vec![num(2.0), Token::Atom("e".into())]),
        ];
        for (input, expected) in cases {
            assert_eq!(tokenize(input), Ok(expected));
        }
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert_eq!(
            tokenize("10 °C"),
            Err(CalcError::UnrecognizedToken("°C".into()))
        );
        assert_eq!(tokenize("."), Err(CalcError::InvalidNumber(".".into())));
    }
}
