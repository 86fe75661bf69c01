use crate::error::{Error, Result};
use crate::proto::{ProtoFieldDescriptor, ProtoMessageDescriptor, ProtoSchema, ProtoType};
use protobuf::descriptor::field_descriptor_proto::{Label, Type};
use protobuf::descriptor::{DescriptorProto, FieldDescriptorProto};
use protobuf_parse::Parser;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

impl ProtoSchema {
    /// Parse a .proto file and create a schema
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();

        let mut parser = Parser::new();
        parser.pure();
        parser.input(p);

        if let Some(parent) = p.parent() {
            parser.include(parent);
        }

        let parsed = parser
            .parse_and_typecheck()
            .map_err(|e| Error::ProtobufParse(e.to_string()))?;

        let mut messages = HashMap::new();

        for file_descriptor in &parsed.file_descriptors {
            let prefix = file_descriptor.package.clone().unwrap_or_default();
            for message in &file_descriptor.message_type {
                Self::register_message(&mut messages, &prefix, message)?;
            }
        }

        debug!(
            "Parsed proto schema {} with {} message types",
            p.display(),
            messages.len()
        );

        Ok(Self::with_messages(messages))
    }

    fn with_messages(messages: HashMap<String, ProtoMessageDescriptor>) -> Self {
        let mut simple_names: HashMap<String, Vec<String>> = HashMap::new();
        for full_name in messages.keys() {
            let simple = full_name.rsplit('.').next().unwrap_or(full_name);
            simple_names
                .entry(simple.to_string())
                .or_default()
                .push(full_name.clone());
        }
        for candidates in simple_names.values_mut() {
            candidates.sort();
        }
        ProtoSchema {
            messages,
            simple_names,
        }
    }

    /// Parse a .proto file content from string
    pub fn from_string(content: &str) -> Result<Self> {
        use std::io::Write;
        use tempfile::Builder;

        // protobuf-parse only reads from disk
        let mut temp_file = Builder::new()
            .suffix(".proto")
            .tempfile()
            .map_err(|e| Error::ProtobufParse(format!("Failed to create temp file: {e}")))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::ProtobufParse(format!("Failed to write temp file: {e}")))?;
        temp_file.flush()?;

        Self::from_file(temp_file.path())
    }

    /// Register a message and, recursively, its nested messages.
    ///
    /// Messages are keyed by fully qualified name, so nested types with the
    /// same simple name (synthesized map entries included) never collide.
    fn register_message(
        messages: &mut HashMap<String, ProtoMessageDescriptor>,
        prefix: &str,
        message: &DescriptorProto,
    ) -> Result<()> {
        let simple_name = message.name.clone().unwrap_or_default();
        let full_name = if prefix.is_empty() {
            simple_name.clone()
        } else {
            format!("{prefix}.{simple_name}")
        };

        let mut fields = HashMap::new();
        let mut field_order = Vec::new();

        for field in &message.field {
            let field_name = field.name.clone().unwrap_or_default();
            if field_name.is_empty() {
                continue;
            }
            field_order.push(field_name.clone());

            let descriptor = ProtoFieldDescriptor {
                name: field_name.clone(),
                number: field.number.unwrap_or(0),
                field_type: Self::parse_field_type(field)?,
                is_repeated: field.label == Some(Label::LABEL_REPEATED.into()),
                is_optional: field.label == Some(Label::LABEL_OPTIONAL.into()),
            };

            fields.insert(field_name, descriptor);
        }

        let is_map_entry = message
            .options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false);

        for nested in &message.nested_type {
            Self::register_message(messages, &full_name, nested)?;
        }

        messages.insert(
            full_name.clone(),
            ProtoMessageDescriptor {
                name: full_name,
                fields,
                field_order,
                is_map_entry,
            },
        );

        Ok(())
    }

    fn parse_field_type(field: &FieldDescriptorProto) -> Result<ProtoType> {
        let field_type_enum_or_unknown = field
            .type_
            .ok_or_else(|| Error::ProtobufParse("Field missing type".to_string()))?;

        let field_type_enum = field_type_enum_or_unknown.enum_value_or_default();

        Ok(match field_type_enum {
            Type::TYPE_DOUBLE => ProtoType::Double,
            Type::TYPE_FLOAT => ProtoType::Float,
            Type::TYPE_INT64 => ProtoType::Int64,
            Type::TYPE_UINT64 => ProtoType::Uint64,
            Type::TYPE_INT32 => ProtoType::Int32,
            Type::TYPE_FIXED64 => ProtoType::Fixed64,
            Type::TYPE_FIXED32 => ProtoType::Fixed32,
            Type::TYPE_BOOL => ProtoType::Bool,
            Type::TYPE_STRING => ProtoType::String,
            Type::TYPE_MESSAGE => ProtoType::Message(field.type_name.clone().unwrap_or_default()),
            Type::TYPE_BYTES => ProtoType::Bytes,
            Type::TYPE_UINT32 => ProtoType::Uint32,
            Type::TYPE_ENUM => ProtoType::Enum(field.type_name.clone().unwrap_or_default()),
            Type::TYPE_SFIXED32 => ProtoType::Sfixed32,
            Type::TYPE_SFIXED64 => ProtoType::Sfixed64,
            Type::TYPE_SINT32 => ProtoType::Sint32,
            Type::TYPE_SINT64 => ProtoType::Sint64,
            Type::TYPE_GROUP => {
                return Err(Error::ProtobufParse(
                    "TYPE_GROUP is Proto2 syntax only and deprecated hence not supported"
                        .to_string(),
                ))
            }
        })
    }

    /// Get a message descriptor by fully qualified name (a leading `.` is
    /// accepted) or by simple name when exactly one message carries it.
    pub fn get_message(&self, name: &str) -> Result<&ProtoMessageDescriptor> {
        let name = name.strip_prefix('.').unwrap_or(name);
        if let Some(descriptor) = self.messages.get(name) {
            return Ok(descriptor);
        }
        match self.simple_names.get(name).map(Vec::as_slice) {
            Some([full_name]) => self
                .messages
                .get(full_name)
                .ok_or_else(|| Error::MessageTypeNotFound(name.to_string())),
            Some(candidates) if candidates.len() > 1 => Err(Error::AmbiguousMessageType {
                name: name.to_string(),
                candidates: candidates.to_vec(),
            }),
            _ => Err(Error::MessageTypeNotFound(name.to_string())),
        }
    }

    /// Descriptor referenced by a message-typed field.
    pub fn message_for(&self, field_type: &ProtoType) -> Result<&ProtoMessageDescriptor> {
        match field_type {
            ProtoType::Message(type_name) => self.get_message(type_name),
            other => Err(Error::MessageTypeNotFound(other.to_string())),
        }
    }

    /// List all message types in the schema by fully qualified name, sorted
    pub fn list_messages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.messages.keys().cloned().collect();
        names.sort();
        names
    }
}

impl ProtoMessageDescriptor {
    /// Get a field descriptor by name
    pub fn get_field(&self, name: &str) -> Result<&ProtoFieldDescriptor> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }
}
