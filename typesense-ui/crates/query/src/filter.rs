//! Per-field filter criteria and their `filter_by` serialization.

use core_types::{CollectionSchema, FieldType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Insertion-ordered filter map keyed by field name.
pub type Filters = IndexMap<String, FilterValue>;

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
}

impl NumericRange {
    pub const fn new(min: Option<Number>, max: Option<Number>) -> Self {
        Self { min, max }
    }

    fn clause(&self, field: &str) -> Option<String> {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) => Some(format!("{field}:[{min}..{max}]")),
            (Some(min), None) => Some(format!("{field}:>={min}")),
            (None, Some(max)) => Some(format!("{field}:<={max}")),
            (None, None) => None,
        }
    }
}

/// Filter criterion for one field. Its shape depends on the field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Range(NumericRange),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn range(min: Option<impl Into<Number>>, max: Option<impl Into<Number>>) -> Self {
        Self::Range(NumericRange::new(min.map(Into::into), max.map(Into::into)))
    }

    /// `Null` and the empty string mean "no criterion".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Interpret raw user input according to the field type.
    ///
    /// Empty input is `Null`. Booleans accept `true`/`false`; numeric fields
    /// accept JSON numbers. Anything that does not parse is kept as text.
    pub fn from_input(field_type: &FieldType, raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Null;
        }
        if field_type.is_bool() {
            match raw {
                "true" => return Self::Bool(true),
                "false" => return Self::Bool(false),
                _ => {}
            }
        }
        if field_type.is_numeric() {
            if let Some(n) = parse_number(raw) {
                return Self::Number(n);
            }
        }
        Self::Text(raw.to_string())
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::Text(_))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Range(r) => match (&r.min, &r.max) {
                (Some(min), Some(max)) => write!(f, "{min}..{max}"),
                (Some(min), None) => write!(f, ">={min}"),
                (None, Some(max)) => write!(f, "<={max}"),
                (None, None) => Ok(()),
            },
        }
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<NumericRange> for FilterValue {
    fn from(r: NumericRange) -> Self {
        Self::Range(r)
    }
}

/// Parse a JSON number; integers stay integers so they print without `.0`.
pub fn parse_number(raw: &str) -> Option<Number> {
    match serde_json::from_str::<serde_json::Value>(raw.trim()) {
        Ok(serde_json::Value::Number(n)) => Some(n),
        _ => None,
    }
}

fn clause(field: &str, field_type: &FieldType, value: &FilterValue) -> Option<String> {
    if field_type.is_text() {
        value.is_scalar().then(|| format!("{field}:={value}"))
    } else if field_type.is_numeric() {
        match value {
            FilterValue::Range(range) => range.clause(field),
            scalar if scalar.is_scalar() => Some(format!("{field}:={scalar}")),
            _ => None,
        }
    } else if field_type.is_bool() {
        matches!(value, FilterValue::Bool(_)).then(|| format!("{field}:={value}"))
    } else {
        None
    }
}

/// Serialize filters into a `filter_by` expression.
///
/// Entries are visited in map order. Blank values, fields missing from the
/// schema, and values that do not fit the field type emit nothing. Returns
/// `None` when no clause survives.
pub fn build_filter_expression(schema: &CollectionSchema, filters: &Filters) -> Option<String> {
    let clauses: Vec<String> = filters
        .iter()
        .filter(|(_, value)| !value.is_blank())
        .filter_map(|(name, value)| {
            let field = schema.field(name)?;
            clause(name, &field.field_type, value)
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" && "))
    }
}
