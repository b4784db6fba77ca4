use std::fmt;
use std::ops::*;

use crate::error::CalcError;

/// A number flowing through the evaluator.
///
/// Intermediate values may briefly leave the finite range (an overflowing
/// product, say); `finite` is the gate every result passes before it is
/// handed back to a caller.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Value(f64);

/// Below this magnitude the text form switches to exponent notation.
const SMALL: f64 = 1e-6;
/// At or above this magnitude the text form switches to exponent notation.
const LARGE: f64 = 1e21;

impl Value {
    pub fn new(value: f64) -> Self {
        Value(value)
    }

    pub fn as_float(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Pass the value through if it is finite, otherwise report the
    /// computation `comp` that produced it.
    pub fn finite<T: ToString>(self, comp: T) -> Result<Self, CalcError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(CalcError::NonFinite(comp.to_string()))
        }
    }

    pub fn pow(self, that: Value) -> Self {
        Value(self.0.powf(that.0))
    }

    pub fn powu(self, i: u32) -> Self {
        Value(self.0.powi(i as i32))
    }
}

/// Text form shared by results, history entries and the memory register:
/// shortest round-trip decimal, with exponent notation at the extremes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // collapses -0 into 0
        let n = if self.0 == 0.0 { 0.0 } else { self.0 };
        let magnitude = n.abs();
        if n.is_finite() && n != 0.0 && (magnitude < SMALL || magnitude >= LARGE) {
            let text = format!("{:e}", n);
            if magnitude >= 1.0 {
                write!(f, "{}", text.replacen('e', "e+", 1))
            } else {
                write!(f, "{}", text)
            }
        } else {
            write!(f, "{}", n)
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value(value)
    }
}

impl From<Value> for f64 {
    fn from(value: Value) -> f64 {
        value.0
    }
}

impl Add for Value {
    type Output = Self;

    fn add(self, that: Value) -> Self::Output {
        Value(self.0 + that.0)
    }
}

impl Sub for Value {
    type Output = Self;

    fn sub(self, that: Value) -> Self::Output {
        Value(self.0 - that.0)
    }
}

impl Mul for Value {
    type Output = Self;

    fn mul(self, that: Value) -> Self::Output {
        Value(self.0 * that.0)
    }
}

impl Div for Value {
    type Output = Result<Self, CalcError>;

    fn div(self, that: Value) -> Self::Output {
        if that.is_zero() {
            return Err(CalcError::DivideByZero);
        }
        Ok(Value(self.0 / that.0))
    }
}

/// Floored remainder: the result takes the sign of the divisor.
impl Rem for Value {
    type Output = Result<Self, CalcError>;

    fn rem(self, that: Value) -> Self::Output {
        if that.is_zero() {
            return Err(CalcError::DivideByZero);
        }
        Ok(Value(self.0 - that.0 * (self.0 / that.0).floor()))
    }
}

impl Neg for Value {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Value(-self.0)
    }
}
