//! Presence checks run on a new student before it is written.
//!
//! The store validates types and bounds itself; this pass only names the first
//! missing field so clients get a precise message without a store round trip.

use roster_core::payload::Payload;
use thiserror::Error;

/// Top-level fields, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "age", "address"];

/// Fields required inside `address`, in the order they are checked.
pub const REQUIRED_ADDRESS_FIELDS: [&str; 2] = ["city", "country"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Missing required address field: {0}")]
    MissingAddressField(&'static str),
}

/// Checks that `payload` carries every required field of a new student.
///
/// An `address` that is not an object counts as having no fields.
pub fn validate_new_student(payload: &Payload) -> Result<(), ValidationError> {
    if let Some(field) = REQUIRED_FIELDS.into_iter().find(|field| !payload.contains(field)) {
        return Err(ValidationError::MissingField(field));
    }

    let address = payload.get("address").and_then(|value| value.as_object());

    match REQUIRED_ADDRESS_FIELDS
        .into_iter()
        .find(|field| !address.is_some_and(|address| address.contains(field)))
    {
        Some(field) => Err(ValidationError::MissingAddressField(field)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use roster_core::payload::Value;

    use super::*;

    fn address(city: Option<&str>, country: Option<&str>) -> Payload {
        let mut address = Payload::new();
        if let Some(city) = city {
            address = address.with("city", city);
        }
        if let Some(country) = country {
            address = address.with("country", country);
        }
        address
    }

    fn student() -> Payload {
        Payload::new()
            .with("name", "Alice")
            .with("age", 20)
            .with("address", address(Some("X"), Some("Y")))
    }

    #[test]
    fn complete_student_passes() {
        assert_eq!(validate_new_student(&student()), Ok(()));
    }

    #[test]
    fn reports_first_missing_top_level_field() {
        assert_eq!(
            validate_new_student(&Payload::new()),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            validate_new_student(&Payload::new().with("name", "Alice").with("address", address(None, None))),
            Err(ValidationError::MissingField("age"))
        );
        assert_eq!(
            validate_new_student(&Payload::new().with("name", "Alice").with("age", 20)),
            Err(ValidationError::MissingField("address"))
        );
    }

    #[test]
    fn top_level_fields_are_checked_before_address() {
        let payload = Payload::new().with("age", 20).with("address", address(None, None));

        assert_eq!(validate_new_student(&payload), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn reports_missing_address_fields_in_order() {
        let base = || Payload::new().with("name", "Alice").with("age", 20);

        assert_eq!(
            validate_new_student(&base().with("address", address(None, None))),
            Err(ValidationError::MissingAddressField("city"))
        );
        assert_eq!(
            validate_new_student(&base().with("address", address(Some("X"), None))),
            Err(ValidationError::MissingAddressField("country"))
        );
    }

    #[test]
    fn non_object_address_has_no_fields() {
        let payload = Payload::new()
            .with("name", "Alice")
            .with("age", 20)
            .with("address", Value::String("X, Y".to_string()));

        assert_eq!(validate_new_student(&payload), Err(ValidationError::MissingAddressField("city")));
    }

    #[test]
    fn null_values_count_as_present() {
        let payload = student().with("name", Value::Null);

        assert_eq!(validate_new_student(&payload), Ok(()));
    }

    #[test]
    fn messages_name_the_field() {
        assert_eq!(ValidationError::MissingField("age").to_string(), "Missing required field: age");
        assert_eq!(
            ValidationError::MissingAddressField("city").to_string(),
            "Missing required address field: city"
        );
    }
}
