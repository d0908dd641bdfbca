//! Untyped request payloads.
//!
//! Incoming JSON bodies are decoded into a [`Payload`]: an ordered map from
//! field name to a small tagged [`Value`]. Field-presence checks work on this
//! type directly, and [`Payload::into_document`] produces the BSON document
//! handed to a backend with fields in the order the client sent them.

use std::fmt;

use bson::{Bson, Document};
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};

/// A single JSON value inside a payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Payload),
}

impl Value {
    pub fn as_object(&self) -> Option<&Payload> {
        match self {
            Value::Object(payload) => Some(payload),
            _ => None,
        }
    }
}

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(b),
            // Integers that fit are stored as 32-bit, matching what drivers do
            // for small native integers. `bsonType: "int"` depends on it.
            Value::Int(i) => match i32::try_from(i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(i),
            },
            Value::Float(f) => Bson::Double(f),
            Value::String(s) => Bson::String(s),
            Value::Array(items) => Bson::Array(items.into_iter().map(Bson::from).collect()),
            Value::Object(payload) => Bson::Document(payload.into_document()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        Value::Object(payload)
    }
}

/// A JSON object received from a client.
///
/// Fields keep their arrival order. A repeated name keeps its first position
/// and its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Vec<(String, Value)>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value under the same name.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field.into(), value.into());
        self
    }

    fn insert(&mut self, field: String, value: Value) {
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Converts the payload into the BSON document stored by a backend.
    pub fn into_document(self) -> Document {
        self.0
            .into_iter()
            .map(|(field, value)| (field, Bson::from(value)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut payload = Payload::new();

        for (field, value) in iter {
            payload.insert(field, value);
        }

        payload
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = Payload;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut payload = Payload::new();

        while let Some((field, value)) = map.next_entry::<String, Value>()? {
            payload.insert(field, value);
        }

        Ok(payload)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn decodes_nested_json_objects() {
        let payload: Payload = serde_json::from_str(
            r#"{"name": "Alice", "age": 20, "address": {"city": "X", "country": "Y"}, "tags": [1, null, 2.5], "active": true}"#,
        )
        .unwrap();

        assert_eq!(payload.get("name"), Some(&Value::String("Alice".into())));
        assert_eq!(payload.get("age"), Some(&Value::Int(20)));
        assert_eq!(payload.get("active"), Some(&Value::Bool(true)));
        assert_eq!(
            payload.get("tags"),
            Some(&Value::Array(vec![Value::Int(1), Value::Null, Value::Float(2.5)]))
        );

        let address = payload.get("address").and_then(Value::as_object).unwrap();
        assert!(address.contains("city"));
        assert!(address.contains("country"));
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert!(serde_json::from_str::<Payload>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Payload>("\"name\"").is_err());
    }

    #[test]
    fn documents_keep_arrival_order() {
        let payload: Payload = serde_json::from_str(
            r#"{"name": "Alice", "age": 20, "address": {"country": "Y", "city": "X"}, "age": 21}"#,
        )
        .unwrap();

        let document = payload.into_document();
        let fields: Vec<&str> = document.keys().map(String::as_str).collect();

        assert_eq!(fields, ["name", "age", "address"]);
        assert_eq!(document.get("age"), Some(&Bson::Int32(21)));
        assert_eq!(
            document.get_document("address").unwrap().keys().collect::<Vec<_>>(),
            ["country", "city"]
        );
    }

    #[test]
    fn small_integers_become_int32() {
        let document = Payload::new()
            .with("age", 20)
            .with("big", 5_000_000_000i64)
            .with("ratio", 0.5)
            .into_document();

        assert_eq!(document.get("age"), Some(&Bson::Int32(20)));
        assert_eq!(document.get("big"), Some(&Bson::Int64(5_000_000_000)));
        assert_eq!(document.get("ratio"), Some(&Bson::Double(0.5)));
    }

    #[test]
    fn nested_objects_become_subdocuments() {
        let document = Payload::new()
            .with("address", Payload::new().with("city", "X").with("country", "Y"))
            .into_document();

        assert_eq!(document, doc! { "address": { "city": "X", "country": "Y" } });
    }
}
