//! Coercion of loosely typed ISS cell values.
//!
//! ISS cells arrive as JSON strings, numbers, booleans or `null`, and use
//! several sentinels for "no data". Every function here maps a sentinel or
//! an unparsable value to `None` instead of failing.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use time::macros::format_description;
use time::Date;

const NO_DATA: [&str; 3] = ["", "-", "—"];
const NO_DATE: &str = "0000-00-00";

/// Non-empty text; numbers and booleans are rendered as text.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Exact decimal. Accepts `,` as the decimal separator and scientific
/// notation.
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(raw) => parse_decimal(raw),
        _ => None,
    }
}

/// Integer, truncating any fractional part toward zero.
pub fn int(value: &Value) -> Option<i64> {
    if let Value::Number(number) = value {
        if let Some(int) = number.as_i64() {
            return Some(int);
        }
    }
    decimal(value)?.trunc().to_i64()
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(value: &Value) -> Option<Date> {
    let Value::String(raw) = value else {
        return None;
    };
    let raw = raw.trim();
    if raw.is_empty() || raw == NO_DATE {
        return None;
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

pub fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if NO_DATA.contains(&raw) {
        return None;
    }

    let normalized = raw.replace(',', ".");
    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()
    } else {
        Decimal::from_str(&normalized).ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::Month;

    use super::*;

    #[test]
    fn date_sentinels_become_absent() {
        assert_eq!(date(&json!("")), None);
        assert_eq!(date(&json!("0000-00-00")), None);
        assert_eq!(date(&json!("2024-13-45")), None);
        assert_eq!(date(&Value::Null), None);
        assert_eq!(
            date(&json!("2031-03-12")),
            Date::from_calendar_date(2031, Month::March, 12).ok()
        );
    }

    #[test]
    fn decimal_sentinels_become_absent() {
        for sentinel in ["", "-", "—", "  ", "n/a"] {
            assert_eq!(decimal(&json!(sentinel)), None, "sentinel {sentinel:?}");
        }
        assert_eq!(decimal(&Value::Null), None);
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(decimal(&json!(68.5)), Decimal::from_str("68.5").ok());
        assert_eq!(decimal(&json!("101,25")), Decimal::from_str("101.25").ok());
        assert_eq!(decimal(&json!("1.5e-3")), Decimal::from_str("0.0015").ok());
        assert_eq!(
            decimal(&json!(0.1)).zip(decimal(&json!(0.2))).map(|(a, b)| a + b),
            Decimal::from_str("0.3").ok()
        );
    }

    #[test]
    fn ints_truncate_toward_zero() {
        assert_eq!(int(&json!(182)), Some(182));
        assert_eq!(int(&json!("10.9")), Some(10));
        assert_eq!(int(&json!("-3.7")), Some(-3));
        assert_eq!(int(&json!("—")), None);
    }

    #[test]
    fn flags_and_text() {
        assert_eq!(flag(&json!(1)), Some(true));
        assert_eq!(flag(&json!("0")), Some(false));
        assert_eq!(flag(&json!("TRUE")), Some(true));
        assert_eq!(flag(&json!("yes")), None);
        assert_eq!(text(&json!("  SBER ")), Some(String::from("SBER")));
        assert_eq!(text(&json!(1000)), Some(String::from("1000")));
        assert_eq!(text(&json!("")), None);
    }
}
