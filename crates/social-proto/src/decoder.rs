//! Protobuf decoder implementation.
//!
//! Uses the schema from the parser module and produces [`ProtoMessage`] /
//! [`ProtoFieldValue`]. Decoding is structural: a buffer is accepted when its
//! tags, wire types and lengths are consistent with the message descriptor,
//! regardless of which fields are populated.

use crate::error::{Error, Result};
use crate::proto::{
    ProtoFieldDescriptor, ProtoFieldValue, ProtoMessage, ProtoMessageDescriptor, ProtoSchema,
    ProtoType,
};
use protobuf::CodedInputStream;
use std::collections::HashMap;
use tracing::trace;

/// Maximum nesting depth of embedded messages (protobuf's default recursion limit).
pub const MAX_NESTING_DEPTH: usize = 100;

const WIRE_VARINT: u32 = 0;
const WIRE_FIXED64: u32 = 1;
const WIRE_LEN: u32 = 2;
const WIRE_FIXED32: u32 = 5;

/// Runtime protobuf decoder.
///
/// Decodes binary protobuf data into ProtoMessage using a parsed schema.
#[derive(Debug, Clone)]
pub struct ProtoDecoder {
    schema: ProtoSchema,
}

impl ProtoDecoder {
    /// Create a new decoder from a schema.
    pub fn new(schema: ProtoSchema) -> Self {
        Self { schema }
    }

    /// Get a reference to the schema.
    pub fn schema(&self) -> &ProtoSchema {
        &self.schema
    }

    /// Decode a protobuf message from bytes.
    pub fn decode(&self, message_type: &str, data: &[u8]) -> Result<ProtoMessage> {
        let descriptor = self.schema.get_message(message_type)?;
        let mut stream = CodedInputStream::from_bytes(data);
        let message = self.decode_message(descriptor, &mut stream, 0)?;
        trace!(
            "Decoded {} ({} bytes, {} fields present)",
            descriptor.name,
            data.len(),
            message.fields.len()
        );
        Ok(message)
    }

    fn decode_message(
        &self,
        descriptor: &ProtoMessageDescriptor,
        stream: &mut CodedInputStream,
        depth: usize,
    ) -> Result<ProtoMessage> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::ProtobufDecode(format!(
                "Message nesting exceeds {MAX_NESTING_DEPTH} levels in {}",
                descriptor.name
            )));
        }

        let mut fields = HashMap::new();

        while !stream.eof()? {
            let tag = stream.read_raw_varint32()?;
            let field_number = (tag >> 3) as i32;
            let wire_type = tag & 0x7;

            if field_number == 0 {
                return Err(Error::ProtobufDecode(format!(
                    "Invalid tag {tag} with field number 0 in message {}",
                    descriptor.name
                )));
            }

            let Some(field_desc) = descriptor.field_by_number(field_number) else {
                trace!(
                    "Skipping unknown field {} (wire type {}) in {}",
                    field_number,
                    wire_type,
                    descriptor.name
                );
                skip_field(stream, wire_type)?;
                continue;
            };

            if field_desc.is_repeated {
                self.decode_repeated(field_desc, wire_type, stream, &mut fields, depth)?;
            } else {
                check_wire_type(field_desc, wire_type)?;
                let value = self.decode_field_value(field_desc, stream, depth)?;
                merge_field(&mut fields, &field_desc.name, value);
            }
        }

        Ok(ProtoMessage {
            message_type: descriptor.name.clone(),
            fields,
            descriptor: descriptor.clone(),
        })
    }

    fn decode_repeated(
        &self,
        field_desc: &ProtoFieldDescriptor,
        wire_type: u32,
        stream: &mut CodedInputStream,
        fields: &mut HashMap<String, ProtoFieldValue>,
        depth: usize,
    ) -> Result<()> {
        if let Some(entry_desc) = self.map_entry_descriptor(&field_desc.field_type) {
            check_wire_type(field_desc, wire_type)?;
            let entry = self.decode_embedded(entry_desc, stream, depth)?;
            let (key, value) = split_map_entry(entry, entry_desc);
            let existing = fields
                .entry(field_desc.name.clone())
                .or_insert_with(|| ProtoFieldValue::Map(Vec::new()));
            if let ProtoFieldValue::Map(entries) = existing {
                entries.push((key, value));
            }
            return Ok(());
        }

        let packed = wire_type == WIRE_LEN && field_desc.field_type.is_packable();
        if !packed {
            check_wire_type(field_desc, wire_type)?;
        }

        let mut new_values = Vec::new();
        if packed {
            let len = stream.read_raw_varint32()?;
            let old_limit = stream.push_limit(len as u64)?;
            while !stream.eof()? {
                new_values.push(self.decode_field_value(field_desc, stream, depth)?);
            }
            ensure_limit_consumed(stream, &field_desc.name)?;
            stream.pop_limit(old_limit);
        } else {
            new_values.push(self.decode_field_value(field_desc, stream, depth)?);
        }

        let existing = fields
            .entry(field_desc.name.clone())
            .or_insert_with(|| ProtoFieldValue::Repeated(Vec::new()));
        if let ProtoFieldValue::Repeated(values) = existing {
            values.extend(new_values);
        }
        Ok(())
    }

    fn decode_field_value(
        &self,
        field_desc: &ProtoFieldDescriptor,
        stream: &mut CodedInputStream,
        depth: usize,
    ) -> Result<ProtoFieldValue> {
        Ok(match &field_desc.field_type {
            ProtoType::Double => ProtoFieldValue::Double(stream.read_double()?),
            ProtoType::Float => ProtoFieldValue::Float(stream.read_float()?),
            ProtoType::Int32 | ProtoType::Enum(_) => ProtoFieldValue::Int32(stream.read_int32()?),
            ProtoType::Sint32 => ProtoFieldValue::Int32(stream.read_sint32()?),
            ProtoType::Sfixed32 => ProtoFieldValue::Int32(stream.read_sfixed32()?),
            ProtoType::Int64 => ProtoFieldValue::Int64(stream.read_int64()?),
            ProtoType::Sint64 => ProtoFieldValue::Int64(stream.read_sint64()?),
            ProtoType::Sfixed64 => ProtoFieldValue::Int64(stream.read_sfixed64()?),
            ProtoType::Uint32 => ProtoFieldValue::Uint32(stream.read_uint32()?),
            ProtoType::Fixed32 => ProtoFieldValue::Uint32(stream.read_fixed32()?),
            ProtoType::Uint64 => ProtoFieldValue::Uint64(stream.read_uint64()?),
            ProtoType::Fixed64 => ProtoFieldValue::Uint64(stream.read_fixed64()?),
            ProtoType::Bool => ProtoFieldValue::Bool(stream.read_bool()?),
            ProtoType::String => ProtoFieldValue::String(stream.read_string()?),
            ProtoType::Bytes => ProtoFieldValue::Bytes(stream.read_bytes()?),
            ProtoType::Message(_) => {
                let nested_descriptor = self.schema.message_for(&field_desc.field_type)?;
                let nested = self.decode_embedded(nested_descriptor, stream, depth)?;
                ProtoFieldValue::Message(Box::new(nested))
            }
            other => {
                return Err(Error::ProtobufDecode(format!(
                    "Unsupported field type: {other}"
                )))
            }
        })
    }

    /// Decode a length-delimited embedded message.
    fn decode_embedded(
        &self,
        descriptor: &ProtoMessageDescriptor,
        stream: &mut CodedInputStream,
        depth: usize,
    ) -> Result<ProtoMessage> {
        let len = stream.read_raw_varint32()?;
        let old_limit = stream.push_limit(len as u64)?;
        let nested = self.decode_message(descriptor, stream, depth + 1)?;
        ensure_limit_consumed(stream, &descriptor.name)?;
        stream.pop_limit(old_limit);
        Ok(nested)
    }

    fn map_entry_descriptor(&self, field_type: &ProtoType) -> Option<&ProtoMessageDescriptor> {
        self.schema
            .message_for(field_type)
            .ok()
            .filter(|desc| desc.is_map_entry)
    }
}

/// Store a singular field value. A message field seen more than once is
/// merged into the earlier copy; any other value replaces it.
fn merge_field(fields: &mut HashMap<String, ProtoFieldValue>, name: &str, value: ProtoFieldValue) {
    match value {
        ProtoFieldValue::Message(later) => match fields.get_mut(name) {
            Some(ProtoFieldValue::Message(existing)) => merge_message(existing, *later),
            _ => {
                fields.insert(name.to_string(), ProtoFieldValue::Message(later));
            }
        },
        value => {
            fields.insert(name.to_string(), value);
        }
    }
}

/// Protobuf merge: singular fields of `later` win, nested messages merge
/// recursively, repeated and map fields append.
fn merge_message(existing: &mut ProtoMessage, later: ProtoMessage) {
    for (name, value) in later.fields {
        match value {
            ProtoFieldValue::Repeated(more) => match existing.fields.get_mut(&name) {
                Some(ProtoFieldValue::Repeated(values)) => values.extend(more),
                _ => {
                    existing.fields.insert(name, ProtoFieldValue::Repeated(more));
                }
            },
            ProtoFieldValue::Map(more) => match existing.fields.get_mut(&name) {
                Some(ProtoFieldValue::Map(entries)) => entries.extend(more),
                _ => {
                    existing.fields.insert(name, ProtoFieldValue::Map(more));
                }
            },
            value => merge_field(&mut existing.fields, &name, value),
        }
    }
}

fn check_wire_type(field_desc: &ProtoFieldDescriptor, actual: u32) -> Result<()> {
    let expected = field_desc.field_type.wire_type();
    if expected != actual {
        return Err(Error::WireTypeMismatch {
            field: field_desc.name.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// A length prefix that runs past the end of the buffer leaves bytes
/// outstanding under the pushed limit once the input is exhausted.
fn ensure_limit_consumed(stream: &CodedInputStream, what: &str) -> Result<()> {
    let remaining = stream.bytes_until_limit();
    if remaining != 0 {
        return Err(Error::ProtobufDecode(format!(
            "Truncated length-delimited value for {what}: {remaining} bytes missing"
        )));
    }
    Ok(())
}

fn skip_field(stream: &mut CodedInputStream, wire_type: u32) -> Result<()> {
    match wire_type {
        WIRE_VARINT => {
            stream.read_raw_varint64()?;
        }
        WIRE_FIXED64 => {
            stream.read_raw_little_endian64()?;
        }
        WIRE_LEN => {
            let len = stream.read_raw_varint32()?;
            stream.read_raw_bytes(len)?;
        }
        WIRE_FIXED32 => {
            stream.read_raw_little_endian32()?;
        }
        other => {
            return Err(Error::ProtobufDecode(format!(
                "Unsupported wire type {other}"
            )))
        }
    }
    Ok(())
}

fn split_map_entry(
    mut entry: ProtoMessage,
    entry_desc: &ProtoMessageDescriptor,
) -> (ProtoFieldValue, ProtoFieldValue) {
    let mut take = |name: &str| {
        entry.fields.remove(name).unwrap_or_else(|| {
            entry_desc
                .fields
                .get(name)
                .map(|f| ProtoFieldValue::default_for(&f.field_type))
                .unwrap_or(ProtoFieldValue::Null)
        })
    };
    let key = take("key");
    let value = take("value");
    (key, value)
}
