//! Named functions and constants that an expression may call.

use std::f64::consts;
use std::fmt;
use std::str::FromStr;

/// How trigonometric arguments and inverse-trigonometric results are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn toggled(self) -> Self {
        match self {
            AngleUnit::Degrees => AngleUnit::Radians,
            AngleUnit::Radians => AngleUnit::Degrees,
        }
    }
}

impl Default for AngleUnit {
    fn default() -> Self {
        AngleUnit::Degrees
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AngleUnit::Degrees => write!(f, "deg"),
            AngleUnit::Radians => write!(f, "rad"),
        }
    }
}

impl FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Ok(AngleUnit::Degrees),
            "rad" | "radian" | "radians" => Ok(AngleUnit::Radians),
            _ => Err(format!("unknown angle unit '{}'", s)),
        }
    }
}

/// Something an identifier can resolve to.
#[derive(Clone, Copy)]
pub enum Callable {
    Constant(f64),
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

impl Callable {
    /// Number of bracketed arguments the callable expects. Constants are
    /// written bare, without brackets.
    pub fn arity(&self) -> usize {
        match *self {
            Callable::Constant(_) => 0,
            Callable::Unary(_) => 1,
            Callable::Binary(_) => 2,
        }
    }

    /// Precondition: `args.len() == self.arity()`
    pub fn call(&self, args: &[f64]) -> f64 {
        match *self {
            Callable::Constant(c) => c,
            Callable::Unary(f) => f(args[0]),
            Callable::Binary(f) => f(args[0], args[1]),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Callable::Constant(c) => write!(f, "Constant({})", c),
            Callable::Unary(_) => write!(f, "Unary"),
            Callable::Binary(_) => write!(f, "Binary"),
        }
    }
}

/// Represents the identifiers visible while evaluating an expression
pub trait FunctionScope {
    /// Look up an identifier, returning `None` if it is not defined.
    fn resolve(&self, name: &str) -> Option<Callable>;
}

/// A scope with no identifiers at all; plain arithmetic only.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScope;

impl FunctionScope for EmptyScope {
    fn resolve(&self, _name: &str) -> Option<Callable> {
        None
    }
}

/// The fixed scientific function table.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScientificScope {
    unit: AngleUnit,
}

impl ScientificScope {
    pub fn new(unit: AngleUnit) -> Self {
        ScientificScope { unit }
    }
}

/// Every name `ScientificScope` resolves.
pub const SCIENTIFIC_NAMES: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "log", "log2", "log10", "sqrt", "pow", "exp",
    "inv", "pi", "e", "tau",
];

impl FunctionScope for ScientificScope {
    fn resolve(&self, name: &str) -> Option<Callable> {
        use self::AngleUnit::*;
        use self::Callable::*;

        let callable = match (name, self.unit) {
            ("sin", Degrees) => Unary(|x| x.to_radians().sin()),
            ("cos", Degrees) => Unary(|x| x.to_radians().cos()),
            ("tan", Degrees) => Unary(|x| x.to_radians().tan()),
            ("sin", Radians) => Unary(f64::sin),
            ("cos", Radians) => Unary(f64::cos),
            ("tan", Radians) => Unary(f64::tan),
            ("asin", Degrees) => Unary(|x| x.asin().to_degrees()),
            ("acos", Degrees) => Unary(|x| x.acos().to_degrees()),
            ("atan", Degrees) => Unary(|x| x.atan().to_degrees()),
            ("asin", Radians) => Unary(f64::asin),
            ("acos", Radians) => Unary(f64::acos),
            ("atan", Radians) => Unary(f64::atan),
            ("log", _) => Unary(f64::ln),
            ("log2", _) => Unary(f64::log2),
            ("log10", _) => Unary(f64::log10),
            ("sqrt", _) => Unary(f64::sqrt),
            ("pow", _) => Binary(f64::powf),
            ("exp", _) => Unary(f64::exp),
            ("inv", _) => Unary(|x| 1.0 / x),
            ("pi", _) => Constant(consts::PI),
            ("e", _) => Constant(consts::E),
            ("tau", _) => Constant(2.0 * consts::PI),
            _ => return None,
        };
        Some(callable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn call(scope: &ScientificScope, name: &str, args: &[f64]) -> f64 {
        scope.resolve(name).map(|f| f.call(args)).unwrap()
    }

    #[test]
    fn degrees() {
        let scope = ScientificScope::new(AngleUnit::Degrees);
        let cases = vec![
            ("sin", 90.0, 1.0),
            ("cos", 180.0, -1.0),
            ("tan", 45.0, 1.0),
            ("asin", 1.0, 90.0),
            ("acos", 0.0, 90.0),
            ("atan", 1.0, 45.0),
        ];
        for (name, arg, expected) in cases {
            let got = call(&scope, name, &[arg]);
            assert!((got - expected).abs() < EPSILON, "{}({}) = {}", name, arg, got);
        }
    }

    #[test]
    fn radians() {
        let scope = ScientificScope::new(AngleUnit::Radians);
        assert!((call(&scope, "sin", &[consts::FRAC_PI_2]) - 1.0).abs() < EPSILON);
        assert!((call(&scope, "asin", &[1.0]) - consts::FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn transcendental() {
        let scope = ScientificScope::default();
        assert_eq!(call(&scope, "log2", &[8.0]), 3.0);
        assert!((call(&scope, "log10", &[1000.0]) - 3.0).abs() < EPSILON);
        assert_eq!(call(&scope, "pow", &[2.0, 10.0]), 1024.0);
        assert_eq!(call(&scope, "inv", &[4.0]), 0.25);
        assert!(call(&scope, "sqrt", &[-1.0]).is_nan());
        assert!(call(&scope, "inv", &[0.0]).is_infinite());
    }

    #[test]
    fn table_is_complete() {
        let scope = ScientificScope::default();
        for name in SCIENTIFIC_NAMES {
            assert!(scope.resolve(name).is_some(), "{} unresolved", name);
        }
        assert!(scope.resolve("sinh").is_none());
        assert!(EmptyScope.resolve("sin").is_none());
    }

    #[test]
    fn unit_names() {
        assert_eq!("radians".parse::<AngleUnit>(), Ok(AngleUnit::Radians));
        assert_eq!("DEG".parse::<AngleUnit>(), Ok(AngleUnit::Degrees));
        assert!("grad".parse::<AngleUnit>().is_err());
        assert_eq!(AngleUnit::Degrees.toggled(), AngleUnit::Radians);
    }
}
