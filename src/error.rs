use std::error::Error;
use std::fmt;

use std::num::ParseFloatError;

/// The coarse failure classes reported to a calculator front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    EvaluationError,
    DivisionByZero,
    GenericError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::SyntaxError => write!(f, "Syntax Error"),
            ErrorKind::EvaluationError => write!(f, "Evaluation Error"),
            ErrorKind::DivisionByZero => write!(f, "Error: Division by zero"),
            ErrorKind::GenericError => write!(f, "Error"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CalcError {
    DivideByZero,
    EmptyExpression,
    InvalidNumber(String),
    InvalidOperator(char),
    UnrecognizedToken(String),
    UnexpectedToken(String, &'static str),
    UnknownAtom(String),
    UnexpectedEndOfInput,
    UnmatchedParenthesis,
    NoFunctionArgument(String),
    BadArity {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A computation left the finite range, e.g. `sqrt(-1)` or an overflow.
    NonFinite(String),
    RecursionLimit,
}

use self::CalcError::*;

impl CalcError {
    /// Collapse a detailed failure into the kind surfaced to the user.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            EmptyExpression
            | InvalidNumber(_)
            | InvalidOperator(_)
            | UnrecognizedToken(_)
            | UnexpectedToken(..)
            | UnexpectedEndOfInput
            | UnmatchedParenthesis
            | NoFunctionArgument(_)
            | BadArity { .. } => ErrorKind::SyntaxError,
            RecursionLimit => ErrorKind::EvaluationError,
            DivideByZero | NonFinite(_) => ErrorKind::DivisionByZero,
            UnknownAtom(_) => ErrorKind::GenericError,
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DivideByZero => write!(f, "attempted to divide by zero"),
            EmptyExpression => write!(f, "empty expression"),
            InvalidNumber(ref number) => {
                write!(f, "invalid number: {}", number)
            }
            InvalidOperator(ref c) => write!(f, "invalid operator: {}", c),
            UnrecognizedToken(ref token) => {
                write!(f, "unrecognized token: {}", token)
            }
            UnexpectedToken(ref token, ref kind) => {
                write!(f, "expected {} token, got {} instead", kind, token)
            }
            UnknownAtom(ref atom) => {
                write!(f, "unknown variable or function '{}'", atom)
            }
            UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            UnmatchedParenthesis => write!(f, "unmatched parenthesis"),
            NoFunctionArgument(ref name) => {
                write!(f, "no bracketed argument for function '{}'", name)
            }
            BadArity {
                ref name,
                expected,
                found,
            } => write!(
                f,
                "function '{}' takes {} argument(s), got {}",
                name, expected, found
            ),
            NonFinite(ref comp) => {
                write!(f, "expression '{}' is not a finite number", comp)
            }
            RecursionLimit => write!(f, "expression is nested too deeply"),
        }
    }
}

impl Error for CalcError {}

impl From<ParseFloatError> for CalcError {
    fn from(data: ParseFloatError) -> CalcError {
        CalcError::InvalidNumber(data.to_string())
    }
}
