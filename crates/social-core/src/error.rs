use crate::candidate::SchemaId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A buffer did not decode as the candidate's schema. Recovered inside
    /// the classifier and never returned from `classify`.
    #[error("Schema mismatch for {schema}: {reason}")]
    SchemaMismatch { schema: SchemaId, reason: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid envelope field '{field}' in {message_type}: {reason}")]
    InvalidEnvelopeField {
        message_type: String,
        field: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
