//! Classification and reporting for encoded player social buffers.
//!
//! A buffer of unknown provenance is trial-decoded against an ordered list
//! of candidate schemas ([`Classifier`]); the first schema that yields a
//! [`DecodedRoot`](social_types::DecodedRoot) wins. A recognized root is then
//! rendered into deterministic text lines ([`render`]) and handed to a
//! [`LineSink`].

pub mod candidate;
pub mod classifier;
pub mod error;
pub mod report;
pub mod sink;

pub use candidate::{BareCandidate, EnvelopeCandidate, SchemaCandidate, SchemaId};
pub use classifier::{Classification, Classifier, ClassifierConfig, Match};
pub use error::{Error, Result};
pub use report::{render, Report};
pub use sink::{LineSink, TracingSink, WriterSink};
