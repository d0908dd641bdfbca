//! Translation of MongoDB driver errors into store errors.

use bson::{Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};

use roster_core::error::{DocumentStoreError, SchemaViolation};

/// Server error code for a write rejected by the collection validator.
pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

/// Maps a driver error onto the store's error type.
///
/// Validator rejections become [`DocumentStoreError::SchemaViolation`]; everything
/// else is reported as an opaque backend failure.
pub(crate) fn translate_error(error: MongoError) -> DocumentStoreError {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DOCUMENT_VALIDATION_FAILURE =>
        {
            DocumentStoreError::SchemaViolation(schema_violation(
                &write_error.message,
                write_error.details.as_ref(),
            ))
        }
        _ => DocumentStoreError::Backend(error.to_string()),
    }
}

/// Builds a violation from a validation failure's message and `errInfo` document.
///
/// The rules live under `errInfo.details.schemaRulesNotSatisfied`; servers that omit
/// the details produce a violation with no rules.
pub(crate) fn schema_violation(message: &str, err_info: Option<&Document>) -> SchemaViolation {
    let rules = err_info
        .and_then(|info| info.get_document("details").ok())
        .and_then(|details| details.get_array("schemaRulesNotSatisfied").ok())
        .map(|rules| {
            rules
                .iter()
                .filter_map(|rule| match rule {
                    Bson::Document(rule) => Some(rule.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    SchemaViolation {
        message: message.to_string(),
        rules_not_satisfied: rules,
    }
}
