//! Unit conversion phrases such as `10 km to miles`.

use crate::error::CalcError;
use crate::value::Value;

/// A conversion selected by a literal phrase in the input.
#[derive(Clone, Copy)]
pub struct Conversion {
    pub phrase: &'static str,
    pub apply: fn(f64) -> f64,
}

/// Phrases are tried in this order and the first match wins.
pub const CONVERSIONS: &[Conversion] = &[
    Conversion { phrase: "m to km", apply: |v| v * 0.001 },
    Conversion { phrase: "km to m", apply: |v| v * 1000.0 },
    Conversion { phrase: "m to cm", apply: |v| v * 100.0 },
    Conversion { phrase: "cm to m", apply: |v| v * 0.01 },
    Conversion { phrase: "m to mm", apply: |v| v * 1000.0 },
    Conversion { phrase: "mm to m", apply: |v| v * 0.001 },
    Conversion { phrase: "km to miles", apply: |v| v * 0.621371 },
    Conversion { phrase: "miles to km", apply: |v| v * 1.60934 },
    Conversion { phrase: "kg to g", apply: |v| v * 1000.0 },
    Conversion { phrase: "g to kg", apply: |v| v * 0.001 },
    Conversion { phrase: "kg to mg", apply: |v| v * 1e6 },
    Conversion { phrase: "mg to kg", apply: |v| v * 1e-6 },
    Conversion { phrase: "cm to mm", apply: |v| v * 10.0 },
    Conversion { phrase: "mm to cm", apply: |v| v * 0.1 },
    Conversion { phrase: "inch to cm", apply: |v| v * 2.54 },
    Conversion { phrase: "cm to inch", apply: |v| v * 0.393701 },
    Conversion { phrase: "°C to °F", apply: |v| v * 9.0 / 5.0 + 32.0 },
    Conversion { phrase: "°F to °C", apply: |v| (v - 32.0) * 5.0 / 9.0 },
    Conversion { phrase: "K to °C", apply: |v| v - 273.15 },
    Conversion { phrase: "°C to K", apply: |v| v + 273.15 },
];

/// The phrases accepted by `convert`, in match order.
pub fn conversions() -> impl Iterator<Item = &'static str> {
    CONVERSIONS.iter().map(|c| c.phrase)
}

fn is_unit_char(c: char) -> bool {
    c.is_alphabetic() || c == '°' || c == '_'
}

/// Locate the first phrase present in `input` as a whole unit token, so
/// that `km to miles` is never read as `km to m` followed by `iles`.
/// Returns the conversion and the byte offset of the phrase.
pub fn find_conversion(input: &str) -> Option<(&'static Conversion, usize)> {
    CONVERSIONS.iter().find_map(|conversion| {
        input
            .match_indices(conversion.phrase)
            .map(|(at, _)| at)
            .find(|&at| {
                let before = input[..at].chars().next_back();
                let after = input[at + conversion.phrase.len()..].chars().next();
                before.map_or(true, |c| !is_unit_char(c))
                    && after.map_or(true, |c| !(is_unit_char(c) || c.is_numeric()))
            })
            .map(|at| (conversion, at))
    })
}

/// Evaluate `input`, applying the conversion named by any phrase it
/// contains to the arithmetic that remains once the phrase is removed.
/// Without a phrase the input is plain arithmetic.
pub fn convert(input: &str) -> Result<Value, CalcError> {
    let (conversion, at) = match find_conversion(input) {
        Some(found) => found,
        None => return crate::eval(input),
    };
    tracing::debug!(phrase = conversion.phrase, "conversion phrase matched");

    let mut operand = String::with_capacity(input.len());
    operand.push_str(&input[..at]);
    operand.push_str(&input[at + conversion.phrase.len()..]);

    let value = crate::eval(operand.trim())?;
    Value::new((conversion.apply)(value.as_float()))
        .finite(format!("{} {}", value, conversion.phrase))
}
