//! Protobuf type definitions.
//!
//! These are the shared data structures for parsed schemas and decoded
//! messages. The parser produces the descriptor types, the decoder produces
//! [`ProtoMessage`] / [`ProtoFieldValue`], and `social-types` turns decoded
//! messages into the typed model.

use std::collections::HashMap;

/// Represents a field value in a decoded protobuf message.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoFieldValue {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Message(Box<ProtoMessage>),
    Repeated(Vec<ProtoFieldValue>),
    /// Entries of a `map<K, V>` field in wire order.
    Map(Vec<(ProtoFieldValue, ProtoFieldValue)>),
    Null,
}

impl ProtoFieldValue {
    /// Get the type descriptor for this field value.
    pub fn proto_field_type(&self) -> ProtoType {
        match self {
            ProtoFieldValue::Double(_) => ProtoType::Double,
            ProtoFieldValue::Float(_) => ProtoType::Float,
            ProtoFieldValue::Int32(_) => ProtoType::Int32,
            ProtoFieldValue::Int64(_) => ProtoType::Int64,
            ProtoFieldValue::Uint32(_) => ProtoType::Uint32,
            ProtoFieldValue::Uint64(_) => ProtoType::Uint64,
            ProtoFieldValue::Bool(_) => ProtoType::Bool,
            ProtoFieldValue::String(_) => ProtoType::String,
            ProtoFieldValue::Bytes(_) => ProtoType::Bytes,
            ProtoFieldValue::Message(msg) => ProtoType::Message(msg.message_type.clone()),
            ProtoFieldValue::Repeated(_) => ProtoType::Repeated(Box::new(ProtoType::Null)),
            ProtoFieldValue::Map(_) => ProtoType::Map,
            ProtoFieldValue::Null => ProtoType::Null,
        }
    }

    /// Proto3 default value for a field of the given type.
    ///
    /// Message-typed fields have no scalar default and yield `Null`.
    pub fn default_for(field_type: &ProtoType) -> ProtoFieldValue {
        match field_type {
            ProtoType::Double => ProtoFieldValue::Double(0.0),
            ProtoType::Float => ProtoFieldValue::Float(0.0),
            ProtoType::Int32 | ProtoType::Sint32 | ProtoType::Sfixed32 | ProtoType::Enum(_) => {
                ProtoFieldValue::Int32(0)
            }
            ProtoType::Int64 | ProtoType::Sint64 | ProtoType::Sfixed64 => {
                ProtoFieldValue::Int64(0)
            }
            ProtoType::Uint32 | ProtoType::Fixed32 => ProtoFieldValue::Uint32(0),
            ProtoType::Uint64 | ProtoType::Fixed64 => ProtoFieldValue::Uint64(0),
            ProtoType::Bool => ProtoFieldValue::Bool(false),
            ProtoType::String => ProtoFieldValue::String(String::new()),
            ProtoType::Bytes => ProtoFieldValue::Bytes(Vec::new()),
            ProtoType::Repeated(_) => ProtoFieldValue::Repeated(Vec::new()),
            ProtoType::Map => ProtoFieldValue::Map(Vec::new()),
            ProtoType::Message(_) | ProtoType::Null => ProtoFieldValue::Null,
        }
    }
}

/// Represents a decoded protobuf message.
///
/// Contains the message type name, decoded fields, and the schema descriptor
/// for field introspection. Fields absent on the wire are absent here.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoMessage {
    /// Message type name (e.g., "mypackage.MyMessage")
    pub message_type: String,
    /// Decoded field values by field name
    pub fields: HashMap<String, ProtoFieldValue>,
    /// Schema reference for field introspection
    pub descriptor: ProtoMessageDescriptor,
}

impl ProtoMessage {
    /// Get a decoded field value by name, `None` when absent on the wire.
    pub fn field(&self, name: &str) -> Option<&ProtoFieldValue> {
        self.fields.get(name)
    }

    /// Whether a field was present on the wire.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// Protobuf field type enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Message(String),
    Enum(String),
    Repeated(Box<ProtoType>),
    Map,
    Null,
}

impl std::fmt::Display for ProtoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = match self {
            ProtoType::Message(name) => return write!(f, "message:{name}"),
            ProtoType::Enum(name) => return write!(f, "enum:{name}"),
            ProtoType::Repeated(inner) => return write!(f, "repeated<{inner}>"),
            ProtoType::Double => "double",
            ProtoType::Float => "float",
            ProtoType::Int32 => "int32",
            ProtoType::Int64 => "int64",
            ProtoType::Uint32 => "uint32",
            ProtoType::Uint64 => "uint64",
            ProtoType::Sint32 => "sint32",
            ProtoType::Sint64 => "sint64",
            ProtoType::Fixed32 => "fixed32",
            ProtoType::Fixed64 => "fixed64",
            ProtoType::Sfixed32 => "sfixed32",
            ProtoType::Sfixed64 => "sfixed64",
            ProtoType::Bool => "bool",
            ProtoType::String => "string",
            ProtoType::Bytes => "bytes",
            ProtoType::Map => "map",
            ProtoType::Null => "null",
        };
        f.write_str(keyword)
    }
}

impl ProtoType {
    /// Wire type this field type is encoded with when not packed.
    ///
    /// 0=varint, 1=64-bit, 2=length-delimited, 5=32-bit.
    pub fn wire_type(&self) -> u32 {
        match self {
            ProtoType::Int32
            | ProtoType::Int64
            | ProtoType::Uint32
            | ProtoType::Uint64
            | ProtoType::Sint32
            | ProtoType::Sint64
            | ProtoType::Bool
            | ProtoType::Enum(_) => 0,
            ProtoType::Double | ProtoType::Fixed64 | ProtoType::Sfixed64 => 1,
            ProtoType::Float | ProtoType::Fixed32 | ProtoType::Sfixed32 => 5,
            ProtoType::String
            | ProtoType::Bytes
            | ProtoType::Message(_)
            | ProtoType::Repeated(_)
            | ProtoType::Map
            | ProtoType::Null => 2,
        }
    }

    /// Whether a repeated field of this type may use the packed encoding.
    pub fn is_packable(&self) -> bool {
        matches!(self.wire_type(), 0 | 1 | 5)
    }

    /// Simple type name of a message/enum reference, without package prefix.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            ProtoType::Message(name) | ProtoType::Enum(name) => {
                Some(name.rsplit('.').next().unwrap_or(name))
            }
            _ => None,
        }
    }
}

/// Describes a single field in a protobuf message.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoFieldDescriptor {
    /// Field name
    pub name: String,
    /// Field number (tag)
    pub number: i32,
    /// Field type
    pub field_type: ProtoType,
    /// Whether the field is repeated
    pub is_repeated: bool,
    /// Whether the field is optional
    pub is_optional: bool,
}

/// Describes a protobuf message type (schema).
#[derive(Debug, Clone, PartialEq)]
pub struct ProtoMessageDescriptor {
    /// Fully qualified message name (e.g., "mypackage.MyMessage")
    pub name: String,
    /// Map of field names to their descriptors
    pub fields: HashMap<String, ProtoFieldDescriptor>,
    /// Ordered list of field names (preserves proto definition order)
    pub field_order: Vec<String>,
    /// Synthesized `XxxEntry` message backing a `map<K, V>` field
    pub is_map_entry: bool,
}

impl ProtoMessageDescriptor {
    /// Find a field descriptor by its wire number.
    pub fn field_by_number(&self, number: i32) -> Option<&ProtoFieldDescriptor> {
        self.fields.values().find(|f| f.number == number)
    }

    /// List all field names in definition order.
    pub fn list_fields(&self) -> &[String] {
        &self.field_order
    }
}

/// Represents a parsed protobuf schema containing multiple message types.
#[derive(Debug, Clone)]
pub struct ProtoSchema {
    /// Descriptors keyed by fully qualified name, without the leading dot
    pub(crate) messages: HashMap<String, ProtoMessageDescriptor>,
    /// Simple name to every fully qualified name sharing it
    pub(crate) simple_names: HashMap<String, Vec<String>>,
}
