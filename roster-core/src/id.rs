//! Opaque record identifiers.
//!
//! Every record is addressed by a store-assigned [`RecordId`]. The external
//! form is the 24-character hexadecimal encoding of a BSON `ObjectId`; parsing
//! it is the only way to obtain a `RecordId` from user input, so malformed
//! identifiers never reach a backend.

use std::{fmt, str::FromStr};

use bson::{Bson, oid::ObjectId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an external identifier string cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("'{0}' is not a valid record identifier, it must be a 12-byte input or a 24-character hex string")]
    Invalid(String),
}

/// The identifier of a single stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(ObjectId);

impl RecordId {
    /// Allocates a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Decodes the external hexadecimal form.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        ObjectId::parse_str(input)
            .map(Self)
            .map_err(|_| IdError::Invalid(input.to_string()))
    }

    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Encodes the identifier in its external hexadecimal form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<RecordId> for ObjectId {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl From<RecordId> for Bson {
    fn from(id: RecordId) -> Self {
        Bson::ObjectId(id.0)
    }
}
