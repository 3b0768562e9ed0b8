//! Structured key/value fields attached to a record
//!
//! Fields keep their insertion order and their keys verbatim. Duplicate keys
//! are kept as well; the encoders write every pair they are given.

use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Rendered as fractional seconds.
    Duration(Duration),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{}s", d.as_secs_f64()),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Text form of any `Display` value.
    pub fn display(value: impl fmt::Display) -> Self {
        FieldValue::String(value.to_string())
    }

    /// Text form of any `Debug` value, for types with no better representation.
    pub fn debug(value: impl fmt::Debug) -> Self {
        FieldValue::String(format!("{:?}", value))
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Non-finite floats have no JSON number form and become strings.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => float_to_json(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => float_to_json(d.as_secs_f64()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

fn float_to_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(value.to_string()))
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u16> for FieldValue {
    fn from(u: u16) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f64::from(f))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Ordered list of structured fields for one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    pairs: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add a field to the list
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.pairs.push((key.into(), value.into()));
        self
    }


    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_creation() {
        let fields = Fields::new();
        assert!(fields.is_empty());
        assert_eq!(fields.len(), 0);
    }

    #[test]
    fn test_fields_preserve_order_and_duplicates() {
        let fields = Fields::new()
            .with_field("zeta", 1)
            .with_field("alpha", "two")
            .with_field("zeta", 3);

        let keys: Vec<&str> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "zeta"]);
        assert_eq!(fields.get("zeta"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_fields_format() {
        let fields = Fields::new()
            .with_field("key1", "value1")
            .with_field("key2", 42);

        assert_eq!(fields.format_fields(), "key1=value1 key2=42");
    }

    #[test]
    fn test_duration_renders_as_seconds() {
        let value = FieldValue::from(Duration::from_millis(12));
        assert_eq!(value.to_json_value(), serde_json::json!(0.012));
        assert_eq!(value.to_string(), "0.012s");
    }

    #[test]
    fn test_non_finite_float_is_not_dropped() {
        assert_eq!(
            FieldValue::from(f64::NAN).to_json_value(),
            serde_json::Value::String("NaN".to_string())
        );
        assert_eq!(
            FieldValue::from(f64::INFINITY).to_json_value(),
            serde_json::Value::String("inf".to_string())
        );
    }

    #[test]
    fn test_option_and_text_conversions() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::String("x".into()));
        assert_eq!(
            FieldValue::display(std::net::Ipv4Addr::LOCALHOST),
            FieldValue::String("127.0.0.1".into())
        );
        assert_eq!(
            FieldValue::debug(vec![1, 2]),
            FieldValue::String("[1, 2]".into())
        );
    }

    #[test]
    fn test_from_iterator() {
        let fields: Fields = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("b"), Some(&FieldValue::Int(2)));
    }
}
