#![cfg_attr(all(test, feature = "nightly"), feature(test))]

#[cfg(all(test, feature = "nightly"))]
extern crate test;

#[cfg(all(test, feature = "nightly"))]
mod bench;


mod error;
mod parse;
mod token;
mod value;

pub mod convert;
pub mod scope;
pub mod session;

pub use error::{CalcError, ErrorKind};
pub use scope::{AngleUnit, Callable, EmptyScope, FunctionScope, ScientificScope};
pub use session::{HistoryEntry, Mode, Session, SessionConfig, SessionState};
pub use value::Value;

/// Evaluate plain arithmetic with no identifiers in scope.
pub fn eval(input: &str) -> Result<Value, CalcError> {
    eval_with_env(input, &EmptyScope)
}

pub fn eval_with_env<S>(input: &str, scope: &S) -> Result<Value, CalcError>
where
    S: FunctionScope + ?Sized,
{
    token::tokenize(input).and_then(|x| parse::parse(&x, scope))
}
