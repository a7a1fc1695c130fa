//! Typed field values.

use serde::{Deserialize, Serialize};

use super::Representation;

/// A single typed value carried by a representation field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextArray(Vec<String>),
    ObjectArray(Vec<Representation>),
}

impl Value {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::TextArray(value)
    }
}

impl From<Vec<Representation>> for Value {
    fn from(value: Vec<Representation>) -> Self {
        Self::ObjectArray(value)
    }
}

/// Decoding shape of a JSON value; `Other` swallows anything unsupported.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum WireValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextArray(Vec<String>),
    ObjectArray(Vec<Representation>),
    Other(serde::de::IgnoredAny),
}

impl WireValue {
    pub(super) fn into_value(self) -> Option<Value> {
        match self {
            Self::Bool(v) => Some(Value::Bool(v)),
            Self::Int(v) => Some(Value::Int(v)),
            Self::Float(v) => Some(Value::Float(v)),
            Self::Text(v) => Some(Value::Text(v)),
            Self::TextArray(v) => Some(Value::TextArray(v)),
            Self::ObjectArray(v) => Some(Value::ObjectArray(v)),
            Self::Other(_) => None,
        }
    }
}
