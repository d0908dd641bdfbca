//! The student record contract.

use roster_core::{
    collection::ID_FIELD,
    query::Projection,
    schema::{BsonType, Property, Schema},
};

use crate::validator::{REQUIRED_ADDRESS_FIELDS, REQUIRED_FIELDS};

/// Structural contract every stored student satisfies.
///
/// ```json
/// {
///   "bsonType": "object",
///   "required": ["name", "age", "address"],
///   "properties": {
///     "name": { "bsonType": "string" },
///     "age": { "bsonType": "int", "minimum": 0 },
///     "address": {
///       "bsonType": "object",
///       "required": ["city", "country"],
///       "properties": {
///         "city": { "bsonType": "string" },
///         "country": { "bsonType": "string" }
///       }
///     }
///   }
/// }
/// ```
///
/// Fields not listed here are stored without validation.
pub fn student_schema() -> Schema {
    let address = Schema::builder()
        .required(REQUIRED_ADDRESS_FIELDS)
        .property("city", Property::of(BsonType::String))
        .property("country", Property::of(BsonType::String))
        .build();

    Schema::builder()
        .required(REQUIRED_FIELDS)
        .property("name", Property::of(BsonType::String))
        .property("age", Property::of(BsonType::Int).minimum(0))
        .property("address", Property::object(address))
        .build()
}

/// Projection for a single student: everything but the identifier.
pub fn detail_projection() -> Projection {
    Projection::exclude([ID_FIELD])
}

/// Projection for listed students: no identifier and no address.
pub fn summary_projection() -> Projection {
    Projection::exclude([ID_FIELD, "address"])
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn validator_matches_published_contract() {
        assert_eq!(
            student_schema().validator(),
            doc! {
                "$jsonSchema": {
                    "bsonType": "object",
                    "required": ["name", "age", "address"],
                    "properties": {
                        "name": { "bsonType": "string" },
                        "age": { "bsonType": "int", "minimum": 0 },
                        "address": {
                            "bsonType": "object",
                            "required": ["city", "country"],
                            "properties": {
                                "city": { "bsonType": "string" },
                                "country": { "bsonType": "string" },
                            },
                        },
                    },
                },
            }
        );
    }

    #[test]
    fn schema_accepts_extra_fields() {
        let student = doc! {
            "name": "Alice",
            "age": 20,
            "address": { "city": "X", "country": "Y", "zip": 1234 },
            "nickname": 7,
        };

        assert!(student_schema().validate(&student).is_ok());
    }

    #[test]
    fn schema_rejects_negative_and_wide_ages() {
        let schema = student_schema();
        let address = doc! { "city": "X", "country": "Y" };

        assert!(schema.validate(&doc! { "name": "A", "age": -1, "address": address.clone() }).is_err());
        assert!(schema.validate(&doc! { "name": "A", "age": 5_000_000_000_i64, "address": address.clone() }).is_err());
        assert!(schema.validate(&doc! { "name": "A", "age": 20.5, "address": address }).is_err());
    }
}
