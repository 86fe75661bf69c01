//! Candidate schemas tried by the classifier.

use crate::error::{Error, Result};
use serde::Serialize;
use social_proto::{ProtoDecoder, ProtoType};
use social_types::{extract_root, root_from_message, DecodedRoot};
use std::sync::Arc;

/// Which shape a buffer was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaId {
    /// Reply envelope carrying the structure as one of its fields
    Envelope,
    /// The structure encoded directly
    Bare,
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaId::Envelope => write!(f, "envelope"),
            SchemaId::Bare => write!(f, "bare"),
        }
    }
}

/// One entry of the classifier's priority list.
///
/// `decode` returns:
/// - `Ok(Some(root))` to accept the buffer,
/// - `Ok(None)` when the buffer decoded but the structure of interest is
///   absent (an envelope without its inner field),
/// - `Err(Error::SchemaMismatch { .. })` when the buffer is not structurally
///   valid under this schema.
pub trait SchemaCandidate: Send + Sync {
    fn id(&self) -> SchemaId;

    /// Protobuf message type this candidate decodes as.
    fn message_type(&self) -> &str;

    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedRoot>>;
}

/// Decodes the envelope message and extracts its inner field.
pub struct EnvelopeCandidate {
    decoder: Arc<ProtoDecoder>,
    message_type: String,
    field: String,
}

impl EnvelopeCandidate {
    /// Create an envelope candidate, checking that `field` exists on
    /// `message_type` and is message-typed.
    pub fn new(decoder: Arc<ProtoDecoder>, message_type: &str, field: &str) -> Result<Self> {
        let descriptor = decoder
            .schema()
            .get_message(message_type)
            .map_err(|e| Error::Schema(e.to_string()))?;
        let field_desc = descriptor
            .get_field(field)
            .map_err(|e| Error::InvalidEnvelopeField {
                message_type: message_type.to_string(),
                field: field.to_string(),
                reason: e.to_string(),
            })?;

        if !matches!(field_desc.field_type, ProtoType::Message(_)) || field_desc.is_repeated {
            return Err(Error::InvalidEnvelopeField {
                message_type: message_type.to_string(),
                field: field.to_string(),
                reason: format!(
                    "expected a singular message field, found {}{}",
                    if field_desc.is_repeated { "repeated " } else { "" },
                    field_desc.field_type
                ),
            });
        }

        Ok(Self {
            decoder,
            message_type: message_type.to_string(),
            field: field.to_string(),
        })
    }
}

impl SchemaCandidate for EnvelopeCandidate {
    fn id(&self) -> SchemaId {
        SchemaId::Envelope
    }

    fn message_type(&self) -> &str {
        &self.message_type
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedRoot>> {
        let mismatch = |reason: String| Error::SchemaMismatch {
            schema: SchemaId::Envelope,
            reason,
        };
        let envelope = self
            .decoder
            .decode(&self.message_type, bytes)
            .map_err(|e| mismatch(e.to_string()))?;
        extract_root(&envelope, &self.field).map_err(|e| mismatch(e.to_string()))
    }
}

/// Decodes the structure directly, without a wrapper.
pub struct BareCandidate {
    decoder: Arc<ProtoDecoder>,
    message_type: String,
}

impl BareCandidate {
    pub fn new(decoder: Arc<ProtoDecoder>, message_type: &str) -> Result<Self> {
        decoder
            .schema()
            .get_message(message_type)
            .map_err(|e| Error::Schema(e.to_string()))?;
        Ok(Self {
            decoder,
            message_type: message_type.to_string(),
        })
    }
}

impl SchemaCandidate for BareCandidate {
    fn id(&self) -> SchemaId {
        SchemaId::Bare
    }

    fn message_type(&self) -> &str {
        &self.message_type
    }

    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedRoot>> {
        let mismatch = |reason: String| Error::SchemaMismatch {
            schema: SchemaId::Bare,
            reason,
        };
        let message = self
            .decoder
            .decode(&self.message_type, bytes)
            .map_err(|e| mismatch(e.to_string()))?;
        root_from_message(&message)
            .map(Some)
            .map_err(|e| mismatch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_types::{social_decoder, BARE_MESSAGE, ENVELOPE_FIELD, ENVELOPE_MESSAGE};

    fn decoder() -> Arc<ProtoDecoder> {
        Arc::new(social_decoder().expect("embedded schema"))
    }

    #[test]
    fn test_envelope_candidate_validates_field() {
        assert!(EnvelopeCandidate::new(decoder(), ENVELOPE_MESSAGE, ENVELOPE_FIELD).is_ok());

        let missing = EnvelopeCandidate::new(decoder(), ENVELOPE_MESSAGE, "guild_info");
        assert!(matches!(missing, Err(Error::InvalidEnvelopeField { .. })));

        let scalar = EnvelopeCandidate::new(decoder(), ENVELOPE_MESSAGE, "retcode");
        let Err(Error::InvalidEnvelopeField { reason, .. }) = scalar else {
            panic!("scalar accessor field should be rejected");
        };
        assert!(reason.contains("int32"));

        let unknown = EnvelopeCandidate::new(decoder(), "GuildRsp", ENVELOPE_FIELD);
        assert!(matches!(unknown, Err(Error::Schema(_))));
    }

    #[test]
    fn test_bare_candidate_rejects_unknown_message() {
        assert!(BareCandidate::new(decoder(), BARE_MESSAGE).is_ok());
        assert!(matches!(
            BareCandidate::new(decoder(), "GuildInfo"),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_mismatch_carries_candidate_id() {
        let bare = BareCandidate::new(decoder(), BARE_MESSAGE).unwrap();
        // field 1 (team) sent as varint
        let err = bare.decode(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaMismatch {
                schema: SchemaId::Bare,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Schema mismatch for bare"));
    }

    #[test]
    fn test_schema_id_display() {
        assert_eq!(SchemaId::Envelope.to_string(), "envelope");
        assert_eq!(SchemaId::Bare.to_string(), "bare");
    }
}
