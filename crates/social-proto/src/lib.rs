//! Runtime protobuf support for `social-probe`.
//!
//! Schemas are parsed from `.proto` text at runtime and buffers are decoded
//! against a named message type without any generated code. The decoder is
//! strict about wire structure (tags, wire types, lengths, UTF-8) and lenient
//! about presence: absent fields are never an error.

/// Schema-driven wire decoder
pub mod decoder;
pub mod error;
/// `.proto` parsing into [`ProtoSchema`]
pub mod parser;
pub mod proto;

pub use decoder::{ProtoDecoder, MAX_NESTING_DEPTH};
pub use error::{Error, Result};
pub use proto::{
    ProtoFieldDescriptor, ProtoFieldValue, ProtoMessage, ProtoMessageDescriptor, ProtoSchema,
    ProtoType,
};
