use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parameter mapping as read from a configuration file
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single configuration value
///
/// Integers and floats are kept apart so that `4` and `4.0` read from JSON
/// stay distinguishable until [`normalize_floats`] folds them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
    Map(ParamMap),
}

impl ParamValue {
    /// Infer a value from its lexical form: all digits is an integer,
    /// anything containing `.` that parses is a float, the rest is text.
    pub fn infer(raw: &str) -> ParamValue {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = raw.parse::<i64>() {
                return ParamValue::Int(i);
            }
        } else if raw.contains('.') {
            if let Ok(f) = raw.parse::<f64>() {
                return ParamValue::Float(f);
            }
        }
        ParamValue::Text(raw.to_string())
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Copy of the value with integral floats turned into integers
    pub fn normalized(&self) -> ParamValue {
        match self {
            ParamValue::Float(f) => match integral(*f) {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Float(*f),
            },
            ParamValue::Map(map) => {
                let mut map = map.clone();
                normalize_floats(&mut map);
                ParamValue::Map(map)
            }
            other => other.clone(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            // Integral floats keep their decimal point, like the JSON they came from
            ParamValue::Float(x) if integral(*x).is_some() => write!(f, "{:.1}", x),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Map(map) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Turn every integral float in `params` into an integer, recursing into
/// nested maps. Applying it twice changes nothing.
pub fn normalize_floats(params: &mut ParamMap) {
    for value in params.values_mut() {
        let replacement = match value {
            ParamValue::Float(f) => integral(*f).map(ParamValue::Int),
            ParamValue::Map(inner) => {
                normalize_floats(inner);
                None
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            *value = replacement;
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    // Beyond 2^53 floats stop being exact integers
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 {
        Some(f as i64)
    } else {
        None
    }
}
