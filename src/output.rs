//! Text and JSON rendering of classification results.

use clap::ValueEnum;
use serde::Serialize;
use social_core::{render, Classification, SchemaId};
use social_types::DecodedRoot;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Report lines
    #[default]
    #[value(name = "text")]
    Text,
    /// One JSON object per buffer
    #[value(name = "json")]
    Json,
}

/// JSON view of one classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyOutput {
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<DecodedRoot>,
    pub report: Vec<String>,
}

impl From<&Classification> for ClassifyOutput {
    fn from(classification: &Classification) -> Self {
        match classification {
            Classification::Matched(m) => Self {
                recognized: true,
                schema: Some(m.schema),
                message_type: Some(m.message_type.clone()),
                root: Some(m.root.clone()),
                report: render(&m.root).into_lines(),
            },
            Classification::NotRecognized => Self {
                recognized: false,
                schema: None,
                message_type: None,
                root: None,
                report: Vec::new(),
            },
        }
    }
}

/// Text lines for one classification: a schema line then the report, or
/// `not recognized`.
pub fn text_lines(classification: &Classification) -> Vec<String> {
    match classification {
        Classification::Matched(m) => {
            let mut lines = vec![format!("schema: {} ({})", m.schema, m.message_type)];
            lines.extend(render(&m.root).into_lines());
            lines
        }
        Classification::NotRecognized => vec!["not recognized".to_string()],
    }
}

/// Per-schema counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub envelope: usize,
    pub bare: usize,
    pub not_recognized: usize,
}

impl BatchSummary {
    pub fn record(&mut self, classification: &Classification) {
        self.total += 1;
        match classification.matched().map(|m| m.schema) {
            Some(SchemaId::Envelope) => self.envelope += 1,
            Some(SchemaId::Bare) => self.bare += 1,
            None => self.not_recognized += 1,
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "summary: {} buffers, envelope {}, bare {}, not recognized {}",
            self.total, self.envelope, self.bare, self.not_recognized
        )
    }
}
