//! Declarative structural contracts for collections.
//!
//! A [`Schema`] names the fields a document must carry and the type and range
//! constraints of each declared property, including constraints on nested
//! objects. It is handed to a backend when a collection is created and the
//! backend enforces it on every write:
//!
//! - backends with native document validation install [`Schema::validator`]
//!   (a MongoDB `$jsonSchema` expression) on the collection;
//! - backends without one call [`Schema::validate`] atomically with each
//!   insert and update.
//!
//! [`Schema::validate`] reports failures in the same structure MongoDB uses for
//! `schemaRulesNotSatisfied`, so callers see one shape whatever the backend.
//!
//! # Example
//!
//! ```ignore
//! use roster_core::schema::{Schema, Property, BsonType};
//!
//! let schema = Schema::builder()
//!     .required(["name", "age"])
//!     .property("name", Property::of(BsonType::String))
//!     .property("age", Property::of(BsonType::Int).minimum(0))
//!     .build();
//! ```

use bson::{Bson, Document, doc};

use crate::error::SchemaViolation;

/// BSON types a property can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonType {
    Object,
    Array,
    String,
    Bool,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    Double,
    Null,
}

impl BsonType {
    /// The alias used for this type in `$jsonSchema` expressions.
    pub fn alias(&self) -> &'static str {
        match self {
            BsonType::Object => "object",
            BsonType::Array => "array",
            BsonType::String => "string",
            BsonType::Bool => "bool",
            BsonType::Int => "int",
            BsonType::Long => "long",
            BsonType::Double => "double",
            BsonType::Null => "null",
        }
    }

    fn matches(&self, value: &Bson) -> bool {
        matches!(
            (self, value),
            (BsonType::Object, Bson::Document(_))
                | (BsonType::Array, Bson::Array(_))
                | (BsonType::String, Bson::String(_))
                | (BsonType::Bool, Bson::Boolean(_))
                | (BsonType::Int, Bson::Int32(_))
                | (BsonType::Long, Bson::Int64(_))
                | (BsonType::Double, Bson::Double(_))
                | (BsonType::Null, Bson::Null)
        )
    }
}

/// Returns the `$type` alias of a stored value.
pub fn type_alias(value: &Bson) -> &'static str {
    match value {
        Bson::Document(_) => "object",
        Bson::Array(_) => "array",
        Bson::String(_) => "string",
        Bson::Boolean(_) => "bool",
        Bson::Int32(_) => "int",
        Bson::Int64(_) => "long",
        Bson::Double(_) => "double",
        Bson::Null => "null",
        Bson::ObjectId(_) => "objectId",
        Bson::DateTime(_) => "date",
        Bson::Decimal128(_) => "decimal",
        Bson::Binary(_) => "binData",
        Bson::Timestamp(_) => "timestamp",
        Bson::RegularExpression(_) => "regex",
        _ => "unknown",
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn int_bson(value: i64) -> Bson {
    match i32::try_from(value) {
        Ok(small) => Bson::Int32(small),
        Err(_) => Bson::Int64(value),
    }
}

/// Constraints on a single declared property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    bson_type: BsonType,
    minimum: Option<i64>,
    object: Option<Box<Schema>>,
}

impl Property {
    /// A property that must hold a value of the given type.
    pub fn of(bson_type: BsonType) -> Self {
        Self {
            bson_type,
            minimum: None,
            object: None,
        }
    }

    /// A property that must hold an object satisfying `schema`.
    pub fn object(schema: Schema) -> Self {
        Self {
            bson_type: BsonType::Object,
            minimum: None,
            object: Some(Box::new(schema)),
        }
    }

    /// Requires numeric values to be greater than or equal to `minimum`.
    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    fn to_json_schema(&self) -> Document {
        let mut rendered = match &self.object {
            Some(schema) => schema.to_json_schema(),
            None => doc! { "bsonType": self.bson_type.alias() },
        };

        if let Some(minimum) = self.minimum {
            rendered.insert("minimum", int_bson(minimum));
        }

        rendered
    }

    /// Evaluates `value` against this property, returning one detail per failed keyword.
    fn unsatisfied(&self, value: &Bson) -> Vec<Bson> {
        let mut details = Vec::new();

        if !self.bson_type.matches(value) {
            details.push(Bson::Document(doc! {
                "operatorName": "bsonType",
                "specifiedAs": { "bsonType": self.bson_type.alias() },
                "reason": "type did not match",
                "consideredValue": value.clone(),
                "consideredType": type_alias(value),
            }));
        }

        if let (Some(minimum), Some(number)) = (self.minimum, as_number(value)) {
            if number < minimum as f64 {
                details.push(Bson::Document(doc! {
                    "operatorName": "minimum",
                    "specifiedAs": { "minimum": int_bson(minimum) },
                    "reason": "comparison failed",
                    "consideredValue": value.clone(),
                }));
            }
        }

        if let (Some(schema), Bson::Document(nested)) = (&self.object, value) {
            details.extend(schema.unsatisfied_rules(nested).into_iter().map(Bson::Document));
        }

        details
    }
}

/// A structural contract for the documents of one collection.
///
/// Fields that are not declared are allowed and left unchecked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    required: Vec<String>,
    properties: Vec<(String, Property)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Renders the contract as a `$jsonSchema` body.
    pub fn to_json_schema(&self) -> Document {
        let mut rendered = doc! { "bsonType": "object" };

        if !self.required.is_empty() {
            rendered.insert("required", self.required.clone());
        }

        if !self.properties.is_empty() {
            rendered.insert(
                "properties",
                self.properties
                    .iter()
                    .map(|(field, property)| (field.clone(), Bson::Document(property.to_json_schema())))
                    .collect::<Document>(),
            );
        }

        rendered
    }

    /// Renders the contract as a collection validator expression.
    pub fn validator(&self) -> Document {
        doc! { "$jsonSchema": self.to_json_schema() }
    }

    /// Checks `document` against the contract.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] listing every unsatisfied rule, with
    /// property failures ahead of missing required fields.
    pub fn validate(&self, document: &Document) -> Result<(), SchemaViolation> {
        let rules = self.unsatisfied_rules(document);

        if rules.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation::new(rules))
        }
    }

    fn unsatisfied_rules(&self, document: &Document) -> Vec<Document> {
        let mut rules = Vec::new();

        let properties_not_satisfied = self
            .properties
            .iter()
            .filter_map(|(field, property)| {
                let value = document.get(field)?;
                let details = property.unsatisfied(value);

                (!details.is_empty()).then(|| {
                    Bson::Document(doc! {
                        "propertyName": field.as_str(),
                        "details": details,
                    })
                })
            })
            .collect::<Vec<_>>();

        if !properties_not_satisfied.is_empty() {
            rules.push(doc! {
                "operatorName": "properties",
                "propertiesNotSatisfied": properties_not_satisfied,
            });
        }

        let missing = self
            .required
            .iter()
            .filter(|field| !document.contains_key(field.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            rules.push(doc! {
                "operatorName": "required",
                "specifiedAs": { "required": self.required.clone() },
                "missingProperties": missing,
            });
        }

        rules
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Adds fields that every document must carry.
    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema
            .required
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Declares constraints for a property. Redeclaring a property replaces it.
    pub fn property(mut self, field: impl Into<String>, property: Property) -> Self {
        let field = field.into();

        match self.schema.properties.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = property,
            None => self.schema.properties.push((field, property)),
        }

        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_schema() -> Schema {
        Schema::builder()
            .required(["name", "age", "home"])
            .property("name", Property::of(BsonType::String))
            .property("age", Property::of(BsonType::Int).minimum(0))
            .property(
                "home",
                Property::object(
                    Schema::builder()
                        .required(["city"])
                        .property("city", Property::of(BsonType::String))
                        .build(),
                ),
            )
            .build()
    }

    #[test]
    fn renders_json_schema_validator() {
        assert_eq!(
            person_schema().validator(),
            doc! {
                "$jsonSchema": {
                    "bsonType": "object",
                    "required": ["name", "age", "home"],
                    "properties": {
                        "name": { "bsonType": "string" },
                        "age": { "bsonType": "int", "minimum": 0 },
                        "home": {
                            "bsonType": "object",
                            "required": ["city"],
                            "properties": {
                                "city": { "bsonType": "string" },
                            },
                        },
                    },
                },
            }
        );
    }

    #[test]
    fn accepts_conforming_documents_with_extra_fields() {
        let document = doc! {
            "name": "Alice",
            "age": 20,
            "home": { "city": "X", "zip": 1234 },
            "nickname": 42,
        };

        assert!(person_schema().validate(&document).is_ok());
    }

    #[test]
    fn reports_missing_required_fields() {
        let violation = person_schema()
            .validate(&doc! { "name": "Alice", "home": { "city": "X" } })
            .unwrap_err();

        assert_eq!(violation.message, "Document failed validation");
        assert_eq!(
            violation.rules_not_satisfied,
            vec![doc! {
                "operatorName": "required",
                "specifiedAs": { "required": ["name", "age", "home"] },
                "missingProperties": ["age"],
            }]
        );
    }

    #[test]
    fn reports_type_mismatch_before_missing_fields() {
        let violation = person_schema()
            .validate(&doc! { "name": 7, "age": 20 })
            .unwrap_err();

        assert_eq!(violation.rules_not_satisfied.len(), 2);
        assert_eq!(
            violation.first_rule(),
            Some(&doc! {
                "operatorName": "properties",
                "propertiesNotSatisfied": [{
                    "propertyName": "name",
                    "details": [{
                        "operatorName": "bsonType",
                        "specifiedAs": { "bsonType": "string" },
                        "reason": "type did not match",
                        "consideredValue": 7,
                        "consideredType": "int",
                    }],
                }],
            })
        );
        assert_eq!(
            violation.rules_not_satisfied[1].get_str("operatorName").ok(),
            Some("required")
        );
    }

    #[test]
    fn reports_values_below_minimum() {
        let violation = person_schema()
            .validate(&doc! { "name": "Alice", "age": -1, "home": { "city": "X" } })
            .unwrap_err();

        assert_eq!(
            violation.rules_not_satisfied,
            vec![doc! {
                "operatorName": "properties",
                "propertiesNotSatisfied": [{
                    "propertyName": "age",
                    "details": [{
                        "operatorName": "minimum",
                        "specifiedAs": { "minimum": 0 },
                        "reason": "comparison failed",
                        "consideredValue": -1,
                    }],
                }],
            }]
        );
    }

    #[test]
    fn int_rule_rejects_doubles_and_longs() {
        let schema = person_schema();

        for age in [Bson::Double(20.5), Bson::Int64(20), Bson::String("20".into())] {
            let document = doc! { "name": "Alice", "age": age, "home": { "city": "X" } };

            assert!(schema.validate(&document).is_err());
        }
    }

    #[test]
    fn reports_nested_object_failures_under_the_parent_property() {
        let violation = person_schema()
            .validate(&doc! { "name": "Alice", "age": 3, "home": { "zip": 1 } })
            .unwrap_err();

        assert_eq!(
            violation.rules_not_satisfied,
            vec![doc! {
                "operatorName": "properties",
                "propertiesNotSatisfied": [{
                    "propertyName": "home",
                    "details": [{
                        "operatorName": "required",
                        "specifiedAs": { "required": ["city"] },
                        "missingProperties": ["city"],
                    }],
                }],
            }]
        );
    }

    #[test]
    fn non_object_value_for_object_property_is_a_type_mismatch() {
        let violation = person_schema()
            .validate(&doc! { "name": "Alice", "age": 3, "home": "X" })
            .unwrap_err();
        let rule = violation.first_rule().unwrap();
        let failed = rule.get_array("propertiesNotSatisfied").unwrap();

        assert_eq!(failed.len(), 1);
        assert_eq!(
            failed[0].as_document().and_then(|d| d.get_str("propertyName").ok()),
            Some("home")
        );
    }

    #[test]
    fn redeclaring_a_property_replaces_it() {
        let schema = Schema::builder()
            .property("age", Property::of(BsonType::Int))
            .property("age", Property::of(BsonType::Long))
            .build();

        assert!(schema.validate(&doc! { "age": 5_i64 }).is_ok());
        assert!(schema.validate(&doc! { "age": 5 }).is_err());
    }
}
