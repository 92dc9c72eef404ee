//! Polars cell value helpers.
//!
//! Conversions here never fail: they return an empty string or `None` and leave
//! it to the caller to decide whether that is a missing value or a coercion error.

use std::borrow::Cow;

use polars::prelude::{AnyValue, DataType};

/// What a cell holds once the Polars storage type is set aside.
enum CellKind<'a> {
    Missing,
    Integer(i64),
    Float(f64),
    Text(Cow<'a, str>),
    Other(String),
}

fn classify<'a>(value: &'a AnyValue<'_>) -> CellKind<'a> {
    match value {
        AnyValue::Null => CellKind::Missing,
        AnyValue::Int8(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::Int16(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::Int32(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::Int64(v) => CellKind::Integer(*v),
        AnyValue::UInt8(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::UInt16(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::UInt32(v) => CellKind::Integer(i64::from(*v)),
        AnyValue::UInt64(v) => match i64::try_from(*v) {
            Ok(v) => CellKind::Integer(v),
            Err(_) => CellKind::Float(*v as f64),
        },
        AnyValue::Float32(v) => CellKind::Float(f64::from(*v)),
        AnyValue::Float64(v) => CellKind::Float(*v),
        AnyValue::String(s) => CellKind::Text(Cow::Borrowed(*s)),
        AnyValue::StringOwned(s) => CellKind::Text(Cow::Borrowed(s.as_str())),
        other => {
            let rendered = other.to_string();
            let unquoted = rendered
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .map(str::to_string);
            CellKind::Other(unquoted.unwrap_or(rendered))
        }
    }
}

/// Converts a Polars `AnyValue` to its textual cell representation.
///
/// Returns an empty string for `Null` and formats floats without trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use medmig_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(40)), "40");
/// assert_eq!(any_to_string(AnyValue::String("O+")), "O+");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match classify(&value) {
        CellKind::Missing => String::new(),
        CellKind::Integer(v) => v.to_string(),
        CellKind::Float(v) => format_numeric(v),
        CellKind::Text(s) => s.into_owned(),
        CellKind::Other(s) => s,
    }
}

/// True when the cell is null, NaN, or holds only whitespace.
pub fn is_blank(value: &AnyValue<'_>) -> bool {
    match classify(value) {
        CellKind::Missing => true,
        CellKind::Float(v) => v.is_nan(),
        CellKind::Text(s) => s.trim().is_empty(),
        CellKind::Integer(_) | CellKind::Other(_) => false,
    }
}

/// True for the integer and floating-point Polars dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Formats a float without trailing zeros after the decimal point.
///
/// Integer-valued floats like 40.0 are formatted as "40", not "4".
///
/// ```
/// use medmig_common::format_numeric;
///
/// assert_eq!(format_numeric(40.0), "40");
/// assert_eq!(format_numeric(18856.28), "18856.28");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        s
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match classify(&value) {
        CellKind::Integer(v) => Some(v as f64),
        CellKind::Float(v) => Some(v).filter(|v| !v.is_nan()),
        CellKind::Text(s) => parse_f64(&s),
        CellKind::Missing | CellKind::Other(_) => None,
    }
}

/// Converts an `AnyValue` to `i64`, returning `None` for non-integer or null values.
///
/// Float cells are truncated toward zero; text must hold an integral number.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match classify(&value) {
        CellKind::Integer(v) => Some(v),
        CellKind::Float(v) if v.is_finite() => Some(v as i64),
        CellKind::Text(s) => parse_i64(&s),
        CellKind::Float(_) | CellKind::Missing | CellKind::Other(_) => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid, empty or NaN strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parses a string as `i64`.
///
/// Integral decimals such as "40.0" are accepted; "40.5" and text are not.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_numbers() {
        assert_eq!(any_to_string(AnyValue::Int64(328)), "328");
        assert_eq!(any_to_string(AnyValue::Float64(25_000.5)), "25000.5");
        assert_eq!(any_to_string(AnyValue::Float64(40.0)), "40");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&AnyValue::Null));
        assert!(is_blank(&AnyValue::String("   ")));
        assert!(is_blank(&AnyValue::Float64(f64::NAN)));
        assert!(!is_blank(&AnyValue::String("Cancer")));
        assert!(!is_blank(&AnyValue::Int64(0)));
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(40.50), "40.5");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int32(42)), Some(42.0));
        assert_eq!(any_to_f64(AnyValue::String("18856.28")), Some(18856.28));
        assert_eq!(any_to_f64(AnyValue::String("N/A")), None);
        assert_eq!(any_to_f64(AnyValue::Float64(f64::NAN)), None);
    }

    #[test]
    fn test_any_to_i64() {
        assert_eq!(any_to_i64(AnyValue::Null), None);
        assert_eq!(any_to_i64(AnyValue::Int64(30)), Some(30));
        assert_eq!(any_to_i64(AnyValue::Float64(62.9)), Some(62));
        assert_eq!(any_to_i64(AnyValue::String("40")), Some(40));
        assert_eq!(any_to_i64(AnyValue::String("N/A")), None);
    }

    #[test]
    fn test_parse_i64_integral_decimal() {
        assert_eq!(parse_i64("40.0"), Some(40));
        assert_eq!(parse_i64(" -3 "), Some(-3));
        assert_eq!(parse_i64("40.5"), None);
        assert_eq!(parse_i64(""), None);
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("  3.25  "), Some(3.25));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("abc"), None);
    }
}
