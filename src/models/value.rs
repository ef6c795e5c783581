use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a [`Table`](crate::models::Table).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    /// Marker left in a datetime column where the source text did not parse.
    NullDateTime,
}

/// Summary type of a whole column, as shown by the `info` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Empty,
    Integer,
    Float,
    Boolean,
    Text,
    DateTime,
    Mixed,
}

impl Value {
    /// `NaN` floats count as missing, like the empty cells they are written as.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null | Value::NullDateTime => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view used for threshold comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Value::Null | Value::NullDateTime => None,
            Value::Float(f) if f.is_nan() => None,
            Value::Text(_) => Some(ColumnKind::Text),
            Value::Integer(_) => Some(ColumnKind::Integer),
            Value::Float(_) => Some(ColumnKind::Float),
            Value::Boolean(_) => Some(ColumnKind::Boolean),
            Value::DateTime(_) => Some(ColumnKind::DateTime),
        }
    }

    /// Appends an exact, hashable encoding of this cell to `key`.
    ///
    /// Two cells produce the same encoding only if they are the same variant
    /// holding the same value; floats compare bitwise so `NaN` rows still
    /// collapse onto each other.
    pub fn write_dedup_key(&self, key: &mut Vec<u8>) {
        match self {
            Value::Null => key.push(0),
            Value::NullDateTime => key.push(1),
            Value::Text(s) => {
                key.push(2);
                key.extend_from_slice(&(s.len() as u64).to_le_bytes());
                key.extend_from_slice(s.as_bytes());
            }
            Value::Integer(i) => {
                key.push(3);
                key.extend_from_slice(&i.to_le_bytes());
            }
            Value::Float(f) => {
                key.push(4);
                key.extend_from_slice(&f.to_bits().to_le_bytes());
            }
            Value::Boolean(b) => {
                key.push(5);
                key.push(u8::from(*b));
            }
            Value::DateTime(dt) => {
                key.push(6);
                key.extend_from_slice(&dt.and_utc().timestamp().to_le_bytes());
                key.extend_from_slice(&dt.nanosecond().to_le_bytes());
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NaN"),
            Value::NullDateTime => write!(f, "NaT"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Integral floats keep one decimal so a reloaded column stays a float column.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}
