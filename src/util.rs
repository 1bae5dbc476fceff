// Utility helpers for coercion, ordering and number formatting.
//
// The batch pipeline writes numbers as loosely typed text, so every numeric
// field goes through `coerce_str`/`coerce_value` before it reaches a record.
use num_format::{Locale, ToFormattedString};
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Trim surrounding whitespace, including a leading byte-order mark.
pub fn trim_text(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Coerce a text field into `f64` using the lenient rules the batch jobs'
/// consumers have always applied.
///
/// - Surrounding whitespace is ignored and blank text becomes `0`.
/// - `Infinity` is accepted with an optional sign.
/// - `0x`, `0o` and `0b` prefixes select an unsigned integer radix.
/// - Anything else must be plain decimal/exponent syntax, or the result is NaN.
pub fn coerce_str(s: &str) -> f64 {
    let s = trim_text(s);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(v) = parse_radix_literal(s) {
        return v;
    }
    // `f64::from_str` would also accept "inf" and "nan"; those are not numbers here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let mut acc = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => acc = acc * radix as f64 + d as f64,
            None => return Some(f64::NAN),
        }
    }
    Some(acc)
}

/// Coerce an optional JSON field into `f64`. A missing field is NaN, `null`
/// is zero, booleans are 0/1 and strings go through [`coerce_str`]. An array
/// coerces through its only element (an empty one is zero); objects and
/// longer arrays are NaN.
pub fn coerce_value(v: Option<&Value>) -> f64 {
    match v {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => coerce_str(s),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [Value::Null] => 0.0,
            // A lone boolean joins to "true"/"false", which is not numeric.
            [Value::Bool(_)] => f64::NAN,
            [only] => coerce_value(Some(only)),
            _ => f64::NAN,
        },
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// Format a JSON number as text; integral floats drop the `.0`.
pub fn number_label(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format!("{}", f),
        _ => n.to_string(),
    }
}

/// Text form of any non-null JSON value; strings are taken verbatim and
/// structured values as compact JSON.
pub fn scalar_label(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_label(n)),
        other => Some(other.to_string()),
    }
}

/// Label of a field that counts as "present": anything except a missing
/// field, `null`, `false`, zero, NaN or an empty string.
pub fn present_label(v: Option<&Value>) -> Option<String> {
    let v = v?;
    let present = match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => true,
    };
    if present {
        scalar_label(v)
    } else {
        None
    }
}

/// Label ordering that ignores case first; labels equal apart from case put
/// the lowercase form first.
pub fn cmp_label(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Descending comparison for numeric sort keys. NaN keys go last so a
/// corrupt value never outranks a real one.
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Parse the leading integer of `s`, ignoring trailing garbage (`"15abc"` is 15).
/// Values past the `i64` range saturate.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = trim_text(s);
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: Vec<i64> = rest
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(i64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits
        .iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(*d));
    Some(if negative { -magnitude } else { magnitude })
}

pub fn format_number(n: f64, max_fraction_digits: usize) -> String {
    // English-locale display formatting:
    // - non-finite values become `N/A`,
    // - the integer part gets thousands separators,
    // - at most `max_fraction_digits` decimals, trailing zeros dropped.
    if !n.is_finite() {
        return "N/A".to_string();
    }
    let s = format!("{:.*}", max_fraction_digits, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next().map(|f| f.trim_end_matches('0')).unwrap_or("");
    let int_val: u128 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if !frac_part.is_empty() {
        res.push('.');
        res.push_str(frac_part);
    }
    if n.is_sign_negative() && (int_val != 0 || !frac_part.is_empty()) {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_str_follows_number_rules() {
        assert_eq!(coerce_str("12.5"), 12.5);
        assert_eq!(coerce_str("  42\r"), 42.0);
        assert_eq!(coerce_str(""), 0.0);
        assert_eq!(coerce_str("1e3"), 1000.0);
        assert_eq!(coerce_str("0x1F"), 31.0);
        assert_eq!(coerce_str("-Infinity"), f64::NEG_INFINITY);
        assert!(coerce_str("abc").is_nan());
        assert!(coerce_str("inf").is_nan());
        assert!(coerce_str("NaN").is_nan());
        assert!(coerce_str("1,000").is_nan());
        assert!(coerce_str("0x").is_nan());
    }

    #[test]
    fn coerce_value_handles_json_types() {
        assert!(coerce_value(None).is_nan());
        assert_eq!(coerce_value(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_value(Some(&json!(true))), 1.0);
        assert_eq!(coerce_value(Some(&json!(7))), 7.0);
        assert_eq!(coerce_value(Some(&json!("3.5"))), 3.5);
        assert!(coerce_value(Some(&json!({"a": 1}))).is_nan());
    }

    #[test]
    fn coerce_value_unwraps_single_element_arrays() {
        assert_eq!(coerce_value(Some(&json!([]))), 0.0);
        assert_eq!(coerce_value(Some(&json!([12]))), 12.0);
        assert_eq!(coerce_value(Some(&json!(["4.5"]))), 4.5);
        assert_eq!(coerce_value(Some(&json!([[7]]))), 7.0);
        assert_eq!(coerce_value(Some(&json!([null]))), 0.0);
        assert!(coerce_value(Some(&json!([true]))).is_nan());
        assert!(coerce_value(Some(&json!([1, 2]))).is_nan());
    }

    #[test]
    fn present_label_skips_falsy_values() {
        assert_eq!(present_label(Some(&json!("Chile"))), Some("Chile".to_string()));
        assert_eq!(present_label(Some(&json!(""))), None);
        assert_eq!(present_label(Some(&json!(0))), None);
        assert_eq!(present_label(Some(&json!(false))), None);
        assert_eq!(present_label(Some(&json!(12))), Some("12".to_string()));
        assert_eq!(present_label(Some(&json!(1.0))), Some("1".to_string()));
        assert_eq!(present_label(Some(&json!(2.5))), Some("2.5".to_string()));
        assert_eq!(present_label(Some(&json!(true))), Some("true".to_string()));
        assert_eq!(present_label(Some(&json!([]))), Some("[]".to_string()));
        assert_eq!(present_label(Some(&Value::Null)), None);
        assert_eq!(present_label(None), None);
    }

    #[test]
    fn cmp_label_ignores_case_first() {
        let mut labels = vec!["Xyz", "abc", "Abc", "zeta"];
        labels.sort_by(|a, b| cmp_label(a, b));
        assert_eq!(labels, vec!["abc", "Abc", "Xyz", "zeta"]);
    }

    #[test]
    fn cmp_desc_puts_nan_last() {
        let mut v = vec![1.0, f64::NAN, 3.0, 2.0];
        v.sort_by(|a, b| cmp_desc(*a, *b));
        assert_eq!(&v[..3], &[3.0, 2.0, 1.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn parse_leading_int_ignores_suffix() {
        assert_eq!(parse_leading_int("15abc"), Some(15));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999"), Some(-i64::MAX));
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn format_number_drops_trailing_zeros() {
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(1234.5, 2), "1,234.5");
        assert_eq!(format_number(12.346, 2), "12.35");
        assert_eq!(format_number(-0.001, 2), "0");
        assert_eq!(format_number(f64::NAN, 2), "N/A");
        assert_eq!(format_number(f64::INFINITY, 0), "N/A");
    }
}
