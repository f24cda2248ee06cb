//! JSON value types and their text encoding.
//!
//! [`Value`] is what an extraction yields: only the sub-value at the end of
//! the path is ever built. Its [`Display`](core::fmt::Display) impl writes
//! compact JSON, which is what the command line prints per document.
use std::collections::BTreeMap;

/// Object members, keyed by name.
pub type Map = BTreeMap<String, Value>;
/// Array elements in document order.
pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// Numbers are always double precision; integers beyond 2^53 lose
/// precision.
///
/// # Examples
///
/// ```
/// use jsonpick::{Value, Map};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// assert_eq!(Value::Number(2.0).to_string(), "2");
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
// Untagged so that serde maps it to plain JSON rather than `{"Number": 1}`.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Map),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if the value is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if the value is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if the value is a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpick::Value;
    ///
    /// assert_eq!(Value::from("x").as_str(), Some("x"));
    /// assert_eq!(Value::Null.as_str(), None);
    /// ```
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if the value is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the members if the value is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }
}

/// Escapes control characters in a string for inclusion in a JSON string literal.
///
/// This function writes to the provided formatter, replacing characters such as
/// quotes, backslashes, control characters (<= U+001F), and Unicode line separators
/// with their JSON escape sequences.
fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            // Escape Unicode line separators which pre-2019 JSON parsers may not handle correctly
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            c if c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            // `f64` displays the shortest round-trip form with no exponent,
            // and integral values without a fraction.
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in map {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    f.write_str("\"")?;
                    write_escaped_string(k, f)?;
                    write!(f, "\":{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Map, Value};

    #[test]
    fn display_is_compact_json() {
        let mut inner = Map::new();
        inner.insert("b".into(), Value::Array(vec![1.0.into(), true.into(), Value::Null]));
        let mut outer = Map::new();
        outer.insert("a".into(), Value::Object(inner));
        outer.insert("s".into(), "x".into());
        assert_eq!(
            Value::Object(outer).to_string(),
            r#"{"a":{"b":[1,true,null]},"s":"x"}"#
        );
    }

    #[test]
    fn display_escapes_strings() {
        let v = Value::String("q\"b\\c\u{1}\u{2028}".into());
        assert_eq!(v.to_string(), r#""q\"b\\c\u0001\u2028""#);
    }

    #[test]
    fn numbers_print_shortest() {
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(1e21).to_string(), "1000000000000000000000");
        assert_eq!(Value::Number(10.0).to_string(), "10");
    }

    #[test]
    fn serde_is_plain_json() {
        let v: Value = serde_json::from_str(r#"{"a":[1,"x",null,false]}"#).unwrap();
        assert_eq!(v.to_string(), r#"{"a":[1,"x",null,false]}"#);
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }
}
