//! Social Probe Library
//!
//! Recognizes encoded player social buffers of unknown provenance and
//! reports their content as deterministic text.
//!
//! # Features
//!
//! - Trial-decode classification: reply envelope first, bare structure second
//! - Deterministic reports, independent of map iteration order
//! - Runtime `.proto` schemas: no generated code, alternate schemas via `--proto-file`
//! - Hex, base64 and raw-file inputs, single or batched
//!
//! # Workspace Crates
//!
//! - `social_proto` - `.proto` parsing and the strict wire decoder
//! - `social_types` - typed model, embedded schema, forward/reverse conversion
//! - `social_core` - classifier, reporter and line sinks
//!
//! # CLI Usage
//!
//! ```bash
//! # Classify one hex buffer
//! social-probe classify --hex 0a0208011202080c
//!
//! # Classify a file with one base64 buffer per line
//! social-probe batch buffers.txt --encoding base64
//!
//! # Produce a demonstration buffer and feed it back
//! social-probe classify --hex "$(social-probe sample --schema envelope)"
//! ```

use clap::Parser;
use social_core::ClassifierConfig;
use social_proto::ProtoSchema;
use social_types::{BARE_MESSAGE, ENVELOPE_FIELD, ENVELOPE_MESSAGE, SOCIAL_PROTO};
use std::path::PathBuf;

pub mod input;
pub mod output;
pub mod sample;

pub use input::{parse_batch, BatchEntry, InputEncoding, InputOpts};
pub use output::{BatchSummary, ClassifyOutput, OutputFormat};
pub use sample::{demo_envelope, demo_root, encode_sample, SampleSchema};

#[derive(Parser, Clone, Debug)]
pub struct ClassifierOpts {
    /// `.proto` file to load instead of the embedded schema
    #[arg(long, env = "SOCIAL_PROBE_PROTO_FILE")]
    pub proto_file: Option<PathBuf>,

    /// Envelope message type, tried first
    #[arg(long, default_value = ENVELOPE_MESSAGE, env = "SOCIAL_PROBE_ENVELOPE_TYPE")]
    pub envelope_type: String,

    /// Bare message type, tried when the envelope does not match
    #[arg(long, default_value = BARE_MESSAGE, env = "SOCIAL_PROBE_BARE_TYPE")]
    pub bare_type: String,

    /// Envelope field holding the bare structure
    #[arg(long, default_value = ENVELOPE_FIELD, env = "SOCIAL_PROBE_ENVELOPE_FIELD")]
    pub envelope_field: String,
}

impl Default for ClassifierOpts {
    fn default() -> Self {
        Self {
            proto_file: None,
            envelope_type: ENVELOPE_MESSAGE.to_string(),
            bare_type: BARE_MESSAGE.to_string(),
            envelope_field: ENVELOPE_FIELD.to_string(),
        }
    }
}

// CLI type → classifier library config
impl From<&ClassifierOpts> for ClassifierConfig {
    fn from(opts: &ClassifierOpts) -> Self {
        Self {
            proto_file: opts.proto_file.clone(),
            envelope_type: opts.envelope_type.clone(),
            bare_type: opts.bare_type.clone(),
            envelope_field: opts.envelope_field.clone(),
        }
    }
}

/// Load the schema the classifier would use: the given file, or the embedded one.
pub fn load_schema(proto_file: Option<&PathBuf>) -> anyhow::Result<ProtoSchema> {
    use anyhow::Context;

    match proto_file {
        Some(path) => ProtoSchema::from_file(path)
            .with_context(|| format!("Failed to load schema from {}", path.display())),
        None => ProtoSchema::from_string(SOCIAL_PROTO).context("Failed to load embedded schema"),
    }
}

/// One line per message, followed by its fields in definition order.
pub fn schema_lines(schema: &ProtoSchema) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for name in schema.list_messages() {
        let message = schema.get_message(&name)?;
        if message.is_map_entry {
            continue;
        }
        lines.push(format!("message {name}"));
        for field_name in message.list_fields() {
            let field = message.get_field(field_name)?;
            let map_entry = schema
                .message_for(&field.field_type)
                .ok()
                .filter(|entry| entry.is_map_entry);
            let type_label = match map_entry {
                Some(entry) => format!(
                    "map<{}, {}>",
                    entry.get_field("key")?.field_type,
                    entry.get_field("value")?.field_type
                ),
                None if field.is_repeated => format!("repeated {}", field.field_type),
                None => field.field_type.to_string(),
            };
            lines.push(format!("  {} = {}: {type_label}", field.name, field.number));
        }
    }
    Ok(lines)
}
