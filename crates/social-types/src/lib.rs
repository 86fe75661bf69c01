//! Player social types for social-probe.
//!
//! This crate owns the typed model the reporter renders, the embedded
//! `.proto` schema it is decoded with, and the conversions between the two.
//!
//! # Architecture
//!
//! ```text
//! Forward (samples, fixtures):  DecodedRoot / Envelope → encoded bytes
//! Reverse (classification):     encoded bytes → ProtoMessage → DecodedRoot
//! ```
//!
//! # Modules
//!
//! - [`model`] - DecodedRoot and its optional substructures
//! - [`schema`] - the embedded schema and candidate message names
//! - [`forward`] - typed model → protobuf encoding
//! - [`reverse`] - decoded protobuf → typed model
//! - [`error`] - Error types for conversion operations

pub mod error;
pub mod forward;
pub mod model;
pub mod reverse;
pub mod schema;

pub use error::{Result, SocialTypesError};
pub use forward::{encode_envelope, encode_root};
pub use model::{
    CommunityInfo, DecodedRoot, Envelope, SocialData, TeamInfo, TeamMemberInfo, UnionInfo,
};
pub use reverse::{extract_root, root_from_message};
pub use schema::{
    social_decoder, social_schema, BARE_MESSAGE, ENVELOPE_FIELD, ENVELOPE_MESSAGE, SOCIAL_PROTO,
};
