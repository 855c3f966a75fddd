//! Coercion rules for loosely-typed payload values.
//!
//! Payloads arrive as JSON produced by systems that are not strict about
//! types: numbers as text with a comma decimal separator, booleans as `0`
//! or `""`, and so on. These functions never fail. Input that cannot be
//! read degrades to a sentinel (NaN for numbers).

use serde_json::Value;

/// Largest integer an IEEE double represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Coerces a payload value to a number.
///
/// Text has its first `,` replaced by `.` before parsing, so `"1,5"` and
/// `"1.5"` read the same.
pub fn to_number(input: &Value) -> f64 {
    match input {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number_text(&s.replacen(',', ".", 1)),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => parse_number_text(&element_text(single)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Parses numeric text the way a lenient wire format expects.
///
/// Surrounding whitespace is ignored and empty text is zero. `0x`, `0o` and
/// `0b` prefixes select a radix, `Infinity` is accepted with an optional
/// sign, and anything else that is not a decimal literal is NaN.
pub fn parse_number_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(radix_value) = parse_radix_literal(trimmed) {
        return radix_value;
    }

    let is_decimal_literal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal_literal {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

// Digits after the prefix must all belong to the radix; no sign is allowed.
// Values past `u64` keep accumulating as a float.
fn parse_radix_literal(text: &str) -> Option<f64> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }
    if let Ok(value) = u64::from_str_radix(digits, radix) {
        return Some(value as f64);
    }
    let value = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0_f64, |acc, d| acc * f64::from(radix) + f64::from(d));
    Some(value)
}

/// Coerces a payload value to its textual representation.
pub fn to_text(input: &Value) -> String {
    match input {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(element_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

// Array elements that are null render as empty text when joined.
fn element_text(input: &Value) -> String {
    match input {
        Value::Null => String::new(),
        other => to_text(other),
    }
}

/// Formats a number as text: integral values without a fraction, magnitudes
/// of at least 1e21 or below 1e-6 in exponent form.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.abs() >= 1e21 || value.abs() < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    value.to_string()
}

/// Coerces a payload value by truthiness.
///
/// `false`, `0`, NaN, `""` and null are false; every other value, including
/// empty arrays and objects, is true.
pub fn to_bool(input: &Value) -> bool {
    match input {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Converts a stored number to its JSON form.
///
/// Integral values within the exactly-representable range become JSON
/// integers so `123` reads back as `123`, not `123.0`. NaN and the
/// infinities have no JSON form and become null.
pub fn number_to_json(value: f64) -> Value {
    if !value.is_finite() {
        return Value::Null;
    }
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
