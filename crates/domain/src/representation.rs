//! Representation — the ordered, typed name/value object exchanged in
//! requests and responses.
//!
//! Writers open an object with [`ObjectWriter::start_object`], append fields
//! with [`ObjectWriter::set`] and close it with [`ObjectWriter::end_object`].
//! Readers walk [`Representation::iter`] once and match on the value type;
//! fields whose type they do not expect are skipped.
//!
//! The JSON bridge keeps field order in both directions. JSON values with no
//! [`Value`] counterpart (`null`, plain nested objects, mixed arrays) are
//! dropped while decoding.

mod value;

pub use value::Value;

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single named field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// An ordered sequence of named, typed fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Representation {
    fields: Vec<Field>,
}

impl Representation {
    /// An empty representation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field without checking for an existing name.
    ///
    /// This is the decoding-side primitive: wire payloads may repeat a name
    /// and a single-pass reader sees every occurrence in order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }

    /// The value a single pass over the fields would end with for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

impl<'a> IntoIterator for &'a Representation {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S, V> FromIterator<(S, V)> for Representation
where
    S: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut rep = Self::new();
        for (name, value) in iter {
            rep.push(name, value);
        }
        rep
    }
}

/// Write session for a single object.
#[derive(Debug, Default)]
pub struct ObjectWriter {
    object: Representation,
}

impl ObjectWriter {
    /// Open a new, empty object.
    #[must_use]
    pub fn start_object() -> Self {
        Self::default()
    }

    /// Set a typed field on the open object.
    ///
    /// Setting a name that is already present replaces its value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.object.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.value = value,
            None => self.object.fields.push(Field { name, value }),
        }
        self
    }

    /// Close the object and hand it over for serialization.
    #[must_use]
    pub fn end_object(self) -> Representation {
        self.object
    }
}

impl Serialize for Representation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Representation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RepresentationVisitor)
    }
}

struct RepresentationVisitor;

impl<'de> Visitor<'de> for RepresentationVisitor {
    type Value = Representation;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a representation object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut rep = Representation::new();
        while let Some((name, wire)) = map.next_entry::<String, value::WireValue>()? {
            if let Some(value) = wire.into_value() {
                rep.push(name, value);
            }
        }
        Ok(rep)
    }
}
