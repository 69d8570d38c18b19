//! Permissive Coercions
//!
//! Lenient conversions used when reading cached payloads and loose remote JSON.
//! Non-numeric input coerces to zero instead of failing.

use serde_json::Value;

/// Parses a float, yielding `0.0` for anything that is not a finite number.
pub fn smart_cast_float(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(num) if num.is_finite() => num,
        _ => 0.0,
    }
}

/// Parses an integer exactly when the text is one, otherwise floors the
/// permissive float parse.
pub fn smart_cast_int(text: &str) -> i64 {
    match text.trim().parse::<i64>() {
        Ok(num) => num,
        Err(_) => smart_cast_float(text).floor() as i64,
    }
}

/// Coerces a JSON value (number or numeric string) to an integer.
pub fn value_to_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(num)) => num
            .as_i64()
            .unwrap_or_else(|| num.as_f64().map(|f| f.floor() as i64).unwrap_or(0)),
        Some(Value::String(text)) => smart_cast_int(text),
        _ => 0,
    }
}

/// Coerces a JSON value to a boolean, falling back to `default` when unclear.
///
/// Accepts booleans, positive/non-positive numbers, single-digit strings and
/// `true|false|yes|no` in any case.
pub fn value_to_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(num)) => num.as_f64().map(|f| f > 0.0).unwrap_or(default),
        Some(Value::String(text)) => {
            let digits = text.strip_prefix('-').unwrap_or(text);
            if digits.len() == 1 && digits.chars().all(|c| c.is_ascii_digit()) {
                return smart_cast_int(text) > 0;
            }
            match text.to_lowercase().as_str() {
                "true" | "yes" => true,
                "false" | "no" => false,
                _ => default,
            }
        }
        _ => default,
    }
}

/// True if `text` has at least `min_len` characters once trimmed.
pub fn not_empty_string(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() >= min_len.max(1)
}

/// Returns the string under `field` when it is non-blank.
pub fn non_empty_field(value: &Value, field: &str, min_len: usize) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| not_empty_string(text, min_len))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_smart_cast_float() {
        assert_eq!(smart_cast_float("2.5"), 2.5);
        assert_eq!(smart_cast_float(" 7 "), 7.0);
        assert_eq!(smart_cast_float("abc"), 0.0);
        assert_eq!(smart_cast_float(""), 0.0);
        assert_eq!(smart_cast_float("NaN"), 0.0);
        assert_eq!(smart_cast_float("inf"), 0.0);
    }

    #[test]
    fn test_smart_cast_int_floors() {
        assert_eq!(smart_cast_int("42"), 42);
        assert_eq!(smart_cast_int("1700000000.75"), 1_700_000_000);
        assert_eq!(smart_cast_int("-1.5"), -2);
        assert_eq!(smart_cast_int("12px"), 0);
    }

    #[test]
    fn test_smart_cast_int_exact_beyond_float_precision() {
        assert_eq!(smart_cast_int("9007199254740993"), 9_007_199_254_740_993);
        assert_eq!(smart_cast_int(" -9223372036854775808 "), i64::MIN);
        assert_eq!(smart_cast_int("abc"), 0);
    }

    #[test]
    fn test_value_to_int() {
        assert_eq!(value_to_int(Some(&json!(12))), 12);
        assert_eq!(value_to_int(Some(&json!(3.9))), 3);
        assert_eq!(value_to_int(Some(&json!("8"))), 8);
        assert_eq!(value_to_int(Some(&json!(null))), 0);
        assert_eq!(value_to_int(None), 0);
    }

    #[test]
    fn test_value_to_bool() {
        assert!(value_to_bool(Some(&json!(true)), false));
        assert!(!value_to_bool(Some(&json!(0)), true));
        assert!(value_to_bool(Some(&json!("1")), false));
        assert!(!value_to_bool(Some(&json!("-1")), true));
        assert!(value_to_bool(Some(&json!("YES")), false));
        assert!(!value_to_bool(Some(&json!("no")), true));
        assert!(value_to_bool(Some(&json!("maybe")), true));
        assert!(!value_to_bool(None, false));
    }

    #[test]
    fn test_not_empty_string() {
        assert!(not_empty_string("ab", 2));
        assert!(!not_empty_string(" a ", 2));
        assert!(!not_empty_string("", 0));
        assert!(not_empty_string("x", 0));
    }
}
