//! Text and number coercions for substituted values.

use serde_json::Value;

/// String shown for `value` when it is substituted into a label.
///
/// Strings are verbatim, numbers use their shortest form (`1`, not `1.0`),
/// arrays join their elements with `,` and objects render as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => number_to_string(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Shortest decimal rendering of `x`, switching to exponent notation outside
/// `[1e-6, 1e21)`.
pub fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let abs = x.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{x}");
    }
    let s = format!("{x:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

/// Numeric view of a value used by `:` formats.
///
/// Numbers are themselves, booleans 1/0, `null` and blank strings 0, other
/// strings parse or give NaN; a one-element array coerces its element.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers here.
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whether a value counts as "set" for plain `%{key}` substitution.
///
/// `null`, `false`, `0`, `NaN` and `""` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text fields accept every truthy value and numeric zero.
pub fn is_valid_text_value(value: &Value) -> bool {
    is_truthy(value) || value.as_f64() == Some(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn displays_numbers_in_shortest_form() {
        assert_eq!(display_value(&json!(1)), "1");
        assert_eq!(display_value(&json!(1.0)), "1");
        assert_eq!(display_value(&json!(0.1)), "0.1");
        assert_eq!(display_value(&json!(-2.5)), "-2.5");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
    }

    #[test]
    fn displays_compound_values() {
        assert_eq!(display_value(&json!([1, null, "a"])), "1,,a");
        assert_eq!(display_value(&json!({ "a": 1 })), "{\"a\":1}");
        assert_eq!(display_value(&Value::Null), "null");
        assert_eq!(display_value(&json!(false)), "false");
    }

    #[test]
    fn coerces_numbers() {
        assert_eq!(to_number(&json!("  12.5 ")), 12.5);
        assert_eq!(to_number(&json!("")), 0.0);
        assert_eq!(to_number(&json!(true)), 1.0);
        assert_eq!(to_number(&json!([3])), 3.0);
        assert!(to_number(&json!("abc")).is_nan());
        assert!(to_number(&json!("inf")).is_nan());
        assert_eq!(to_number(&json!("1e3")), 1000.0);
    }

    #[test]
    fn text_value_validity_keeps_zero() {
        assert!(!is_truthy(&json!(0)));
        assert!(is_valid_text_value(&json!(0)));
        assert!(is_valid_text_value(&json!(0.0)));
        assert!(!is_valid_text_value(&json!("")));
        assert!(!is_valid_text_value(&Value::Null));
        assert!(is_valid_text_value(&json!("x")));
    }
}
