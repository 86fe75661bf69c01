//! Embedded player social schema.

use crate::error::Result;
use social_proto::{ProtoDecoder, ProtoSchema};

/// `.proto` source for the player social messages.
pub const SOCIAL_PROTO: &str = include_str!("../proto/social.proto");

/// Bare message type: the structure of interest encoded directly.
pub const BARE_MESSAGE: &str = "PlayerSocialInfo";

/// Envelope message type wrapping [`BARE_MESSAGE`].
pub const ENVELOPE_MESSAGE: &str = "PlayerSocialInfoRsp";

/// Envelope field holding the bare structure.
pub const ENVELOPE_FIELD: &str = "social_info";

/// Parse the embedded schema.
pub fn social_schema() -> Result<ProtoSchema> {
    Ok(ProtoSchema::from_string(SOCIAL_PROTO)?)
}

/// Decoder over the embedded schema.
pub fn social_decoder() -> Result<ProtoDecoder> {
    Ok(ProtoDecoder::new(social_schema()?))
}
