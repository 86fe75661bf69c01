use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Protobuf parse error: {0}")]
    ProtobufParse(String),

    #[error("Protobuf decode error: {0}")]
    ProtobufDecode(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Wire type mismatch for field '{field}': expected {expected}, got {actual}")]
    WireTypeMismatch {
        field: String,
        expected: u32,
        actual: u32,
    },

    #[error("Message type not found: {0}")]
    MessageTypeNotFound(String),

    #[error("Ambiguous message type '{name}', use one of: {}", .candidates.join(", "))]
    AmbiguousMessageType {
        name: String,
        candidates: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<protobuf::Error> for Error {
    fn from(e: protobuf::Error) -> Self {
        Error::ProtobufDecode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
