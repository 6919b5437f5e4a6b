//! The typed cell-value model and its conversion rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// Textual forms treated as absent data. The check applies only to
/// textual cells; a numeric cell is never missing.
pub const MISSING_MARKERS: [&str; 4] = ["", "NA", "NaN", "#N/A"];

/// Returns true if the trimmed text is one of the missing markers.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// A single typed value at a row/column intersection.
///
/// Exactly one variant is active at a time. There is no null variant:
/// absent data is an empty [`CellValue::Text`] (see [`MISSING_MARKERS`]).
///
/// Variant order matters for untagged deserialization: integers are
/// preferred over floats, mirroring [`CellValue::parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer (values above `i64::MAX`).
    UInt(u64),
    /// Double-precision float.
    Float(f64),
    /// Text, including the empty string used for missing data.
    Text(String),
}

impl CellValue {
    /// Parses raw text into a cell value with type inference.
    ///
    /// Missing markers become empty text. Otherwise the literal is tried
    /// as boolean, signed integer, unsigned integer, then float; only a
    /// whole-token match infers a non-text kind. `parse("5")` yields
    /// `Int(5)`, never `Text("5")`.
    pub fn parse(raw: &str) -> CellValue {
        if is_missing(raw) {
            return CellValue::Text(String::new());
        }
        match raw {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(u) = raw.parse::<u64>() {
            return CellValue::UInt(u);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return CellValue::Float(x);
        }
        CellValue::Text(raw.to_string())
    }

    /// Name of the active variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "bool",
            CellValue::UInt(_) => "uint",
        }
    }

    /// Returns true if this cell represents missing data: a textual cell
    /// whose value is one of the missing markers.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Text(s) if is_missing(s))
    }

    /// Converts this cell to `T`, applying the cross-type coercion rules
    /// of [`FromCell`].
    pub fn convert<T: FromCell>(&self) -> Result<T> {
        T::from_cell(self)
    }
}

impl fmt::Display for CellValue {
    /// String form used for CSV output and merge/dedup keys.
    ///
    /// Whole-valued floats print in integer form (`25.0` → `"25"`) so an
    /// `Int(25)` and a `Float(25.0)` produce the same key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::UInt(u) => write!(f, "{u}"),
            CellValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            CellValue::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
                    write!(f, "{}", *x as i64)
                } else {
                    write!(f, "{x}")
                }
            }
        }
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        CellValue::UInt(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

/// Typed extraction from a [`CellValue`].
///
/// An exact variant match returns the payload. A textual cell is re-parsed
/// with the target type's literal rules; the parse is strict (the whole
/// string must match) and missing markers fail with
/// [`TableError::ConversionFailed`]. The only cross-type coercions are
/// target-side: float widens from int/uint, bool treats a nonzero int/uint
/// as true, and uint casts from int/float. Everything else is a
/// [`TableError::TypeMismatch`].
pub trait FromCell: Sized {
    /// Target type name, for error messages.
    const TYPE_NAME: &'static str;

    fn from_cell(value: &CellValue) -> Result<Self>;
}

/// Strict whole-string parse of a textual cell, rejecting missing markers.
fn parse_text<T: std::str::FromStr>(text: &str, to: &'static str) -> Result<T> {
    if is_missing(text) {
        return Err(TableError::ConversionFailed {
            value: text.to_string(),
            to,
        });
    }
    text.parse().map_err(|_| TableError::ConversionFailed {
        value: text.to_string(),
        to,
    })
}

impl FromCell for String {
    const TYPE_NAME: &'static str = "text";

    fn from_cell(value: &CellValue) -> Result<Self> {
        match value {
            CellValue::Text(s) => Ok(s.clone()),
            other => Err(TableError::TypeMismatch {
                from: other.kind(),
                to: Self::TYPE_NAME,
            }),
        }
    }
}

impl FromCell for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_cell(value: &CellValue) -> Result<Self> {
        match value {
            CellValue::Int(i) => Ok(*i),
            CellValue::Text(s) => parse_text(s, Self::TYPE_NAME),
            other => Err(TableError::TypeMismatch {
                from: other.kind(),
                to: Self::TYPE_NAME,
            }),
        }
    }
}

impl FromCell for u64 {
    const TYPE_NAME: &'static str = "uint";

    fn from_cell(value: &CellValue) -> Result<Self> {
        match value {
            CellValue::UInt(u) => Ok(*u),
            CellValue::Int(i) => Ok(*i as u64),
            CellValue::Float(x) => Ok(*x as u64),
            CellValue::Text(s) => parse_text(s, Self::TYPE_NAME),
            other => Err(TableError::TypeMismatch {
                from: other.kind(),
                to: Self::TYPE_NAME,
            }),
        }
    }
}

impl FromCell for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_cell(value: &CellValue) -> Result<Self> {
        match value {
            CellValue::Float(x) => Ok(*x),
            CellValue::Int(i) => Ok(*i as f64),
            CellValue::UInt(u) => Ok(*u as f64),
            CellValue::Text(s) => parse_text(s, Self::TYPE_NAME),
            other => Err(TableError::TypeMismatch {
                from: other.kind(),
                to: Self::TYPE_NAME,
            }),
        }
    }
}

impl FromCell for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_cell(value: &CellValue) -> Result<Self> {
        match value {
            CellValue::Bool(b) => Ok(*b),
            CellValue::Int(i) => Ok(*i != 0),
            CellValue::UInt(u) => Ok(*u != 0),
            CellValue::Text(s) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(TableError::ConversionFailed {
                    value: s.clone(),
                    to: Self::TYPE_NAME,
                }),
            },
            other => Err(TableError::TypeMismatch {
                from: other.kind(),
                to: Self::TYPE_NAME,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefers_int_over_float() {
        assert_eq!(CellValue::parse("5"), CellValue::Int(5));
        assert_eq!(CellValue::parse("-5"), CellValue::Int(-5));
        assert_eq!(CellValue::parse("5.0"), CellValue::Float(5.0));
    }

    #[test]
    fn parse_large_unsigned() {
        // Above i64::MAX, below u64::MAX.
        assert_eq!(
            CellValue::parse("18446744073709551615"),
            CellValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn parse_booleans() {
        assert_eq!(CellValue::parse("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("false"), CellValue::Bool(false));
        // Case-sensitive: anything else stays text.
        assert_eq!(
            CellValue::parse("True"),
            CellValue::Text("True".to_string())
        );
    }

    #[test]
    fn parse_missing_markers_become_empty_text() {
        for marker in MISSING_MARKERS {
            assert_eq!(
                CellValue::parse(marker),
                CellValue::Text(String::new()),
                "marker {marker:?}"
            );
        }
        assert_eq!(CellValue::parse("  "), CellValue::Text(String::new()));
    }

    #[test]
    fn parse_partial_numeric_stays_text() {
        assert_eq!(
            CellValue::parse("5 apples"),
            CellValue::Text("5 apples".to_string())
        );
        assert_eq!(CellValue::parse("5."), CellValue::Float(5.0));
    }

    #[test]
    fn display_whole_float_drops_fraction() {
        assert_eq!(CellValue::Float(25.0).to_string(), "25");
        assert_eq!(CellValue::Float(90.5).to_string(), "90.5");
        assert_eq!(CellValue::Int(25).to_string(), "25");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn display_parse_round_trip() {
        let values = [
            CellValue::Int(-42),
            CellValue::UInt(u64::MAX),
            CellValue::Float(3.25),
            CellValue::Bool(false),
            CellValue::Text("hello world".to_string()),
        ];
        for v in values {
            assert_eq!(CellValue::parse(&v.to_string()), v);
        }
        // Documented exceptions: text colliding with inferred forms, and
        // whole-valued floats, do not round-trip.
        assert_eq!(CellValue::parse("5"), CellValue::Int(5));
        assert_eq!(
            CellValue::parse(&CellValue::Float(85.0).to_string()),
            CellValue::Int(85)
        );
    }

    #[test]
    fn convert_exact_variants() {
        assert_eq!(CellValue::Int(7).convert::<i64>().unwrap(), 7);
        assert_eq!(CellValue::Float(1.5).convert::<f64>().unwrap(), 1.5);
        assert_eq!(
            CellValue::Text("abc".to_string())
                .convert::<String>()
                .unwrap(),
            "abc"
        );
    }

    #[test]
    fn convert_widening_rules() {
        assert_eq!(CellValue::Int(3).convert::<f64>().unwrap(), 3.0);
        assert_eq!(CellValue::UInt(3).convert::<f64>().unwrap(), 3.0);
        assert!(CellValue::Int(2).convert::<bool>().unwrap());
        assert!(!CellValue::UInt(0).convert::<bool>().unwrap());
        assert_eq!(CellValue::Int(9).convert::<u64>().unwrap(), 9);
        assert_eq!(CellValue::Float(9.7).convert::<u64>().unwrap(), 9);
    }

    #[test]
    fn convert_text_is_strict() {
        assert_eq!(
            CellValue::Text("42".to_string()).convert::<i64>().unwrap(),
            42
        );
        let err = CellValue::Text("42x".to_string())
            .convert::<i64>()
            .unwrap_err();
        assert!(matches!(err, TableError::ConversionFailed { .. }));
        let err = CellValue::Text("1.5rest".to_string())
            .convert::<f64>()
            .unwrap_err();
        assert!(matches!(err, TableError::ConversionFailed { .. }));
    }

    #[test]
    fn convert_missing_marker_fails() {
        for marker in MISSING_MARKERS {
            let cell = CellValue::Text(marker.to_string());
            assert!(matches!(
                cell.convert::<i64>(),
                Err(TableError::ConversionFailed { .. })
            ));
        }
    }

    #[test]
    fn convert_without_rule_is_type_mismatch() {
        assert!(matches!(
            CellValue::Int(1).convert::<String>(),
            Err(TableError::TypeMismatch { .. })
        ));
        assert!(matches!(
            CellValue::Float(1.0).convert::<i64>(),
            Err(TableError::TypeMismatch { .. })
        ));
        assert!(matches!(
            CellValue::Bool(true).convert::<f64>(),
            Err(TableError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn bool_from_text_literals() {
        for (text, expected) in [("true", true), ("1", true), ("false", false), ("0", false)] {
            assert_eq!(
                CellValue::Text(text.to_string()).convert::<bool>().unwrap(),
                expected
            );
        }
        assert!(CellValue::Text("yes".to_string()).convert::<bool>().is_err());
    }

    #[test]
    fn serde_untagged_round_trip() {
        let cells = vec![
            CellValue::Text("a".to_string()),
            CellValue::Int(-1),
            CellValue::UInt(u64::MAX),
            CellValue::Float(2.5),
            CellValue::Bool(true),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }
}
