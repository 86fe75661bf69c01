//! Error types for social-types crate.

use social_proto::ProtoType;
use thiserror::Error;

/// Errors that can occur converting between wire messages and the typed model.
#[derive(Error, Debug)]
pub enum SocialTypesError {
    #[error("Protobuf encoding error: {0}")]
    ProtobufEncode(String),

    #[error("Invalid type for field '{field}': expected {expected}, got {actual}")]
    TypeConversion {
        field: String,
        expected: ProtoType,
        actual: ProtoType,
    },

    #[error(transparent)]
    Proto(#[from] social_proto::Error),
}

impl From<protobuf::Error> for SocialTypesError {
    fn from(e: protobuf::Error) -> Self {
        SocialTypesError::ProtobufEncode(e.to_string())
    }
}

/// Result type alias for social-types operations.
pub type Result<T> = std::result::Result<T, SocialTypesError>;
