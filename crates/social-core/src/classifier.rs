//! Trial-decode classifier.
//!
//! Buffers carry no type discriminator, so classification is
//! decode-and-check: each candidate in the priority list attempts a full
//! decode and the first one that accepts wins. Decode failures are an
//! ordinary branch outcome here and never leave [`Classifier::classify`].

use crate::candidate::{BareCandidate, EnvelopeCandidate, SchemaCandidate, SchemaId};
use crate::error::{Error, Result};
use serde::Serialize;
use social_proto::{ProtoDecoder, ProtoSchema};
use social_types::{DecodedRoot, BARE_MESSAGE, ENVELOPE_FIELD, ENVELOPE_MESSAGE, SOCIAL_PROTO};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration for the default envelope-then-bare candidate list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// `.proto` file to load instead of the embedded schema
    pub proto_file: Option<PathBuf>,
    /// Envelope message type, tried first
    pub envelope_type: String,
    /// Bare message type, tried second
    pub bare_type: String,
    /// Envelope field holding the bare structure
    pub envelope_field: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            proto_file: None,
            envelope_type: ENVELOPE_MESSAGE.to_string(),
            bare_type: BARE_MESSAGE.to_string(),
            envelope_field: ENVELOPE_FIELD.to_string(),
        }
    }
}

/// A recognized buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub schema: SchemaId,
    pub message_type: String,
    pub root: DecodedRoot,
}

/// Outcome of [`Classifier::classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Matched(Match),
    NotRecognized,
}

impl Classification {
    pub fn is_recognized(&self) -> bool {
        matches!(self, Classification::Matched(_))
    }

    pub fn matched(&self) -> Option<&Match> {
        match self {
            Classification::Matched(m) => Some(m),
            Classification::NotRecognized => None,
        }
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            Classification::Matched(m) => Some(m),
            Classification::NotRecognized => None,
        }
    }
}

/// Ordered list of candidate schemas evaluated top-down, first match wins.
pub struct Classifier {
    candidates: Vec<Box<dyn SchemaCandidate>>,
}

impl Classifier {
    /// Build a classifier over an explicit priority list.
    pub fn new(candidates: Vec<Box<dyn SchemaCandidate>>) -> Self {
        Self { candidates }
    }

    /// Build the envelope-then-bare classifier described by `config`.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let schema = match &config.proto_file {
            Some(path) => ProtoSchema::from_file(path),
            None => ProtoSchema::from_string(SOCIAL_PROTO),
        }
        .map_err(|e| Error::Schema(e.to_string()))?;

        let decoder = Arc::new(ProtoDecoder::new(schema));
        let envelope = EnvelopeCandidate::new(
            Arc::clone(&decoder),
            &config.envelope_type,
            &config.envelope_field,
        )?;
        let bare = BareCandidate::new(decoder, &config.bare_type)?;

        debug!(
            "Classifier ready: {} ({}.{}) then {} ({})",
            SchemaId::Envelope,
            config.envelope_type,
            config.envelope_field,
            SchemaId::Bare,
            config.bare_type
        );

        Ok(Self::new(vec![Box::new(envelope), Box::new(bare)]))
    }

    /// Candidates in priority order.
    pub fn candidates(&self) -> &[Box<dyn SchemaCandidate>] {
        &self.candidates
    }

    /// Classify a buffer against the candidates in priority order.
    ///
    /// Empty input is not recognized without invoking any candidate.
    ///
    /// Presence of the envelope's inner field is the only envelope
    /// signal. A buffer made only of fields unknown to both messages
    /// decodes as an envelope without that field, falls through, and is
    /// then accepted as a bare structure with every section absent.
    pub fn classify(&self, bytes: &[u8]) -> Classification {
        if bytes.is_empty() {
            trace!("Empty input, skipping decode");
            return Classification::NotRecognized;
        }

        for candidate in &self.candidates {
            match candidate.decode(bytes) {
                Ok(Some(root)) => {
                    trace!(
                        "Matched {} ({}) on {} bytes",
                        candidate.id(),
                        candidate.message_type(),
                        bytes.len()
                    );
                    return Classification::Matched(Match {
                        schema: candidate.id(),
                        message_type: candidate.message_type().to_string(),
                        root,
                    });
                }
                Ok(None) => {
                    debug!(
                        "{} ({}) decoded without the structure of interest, trying next candidate",
                        candidate.id(),
                        candidate.message_type()
                    );
                }
                Err(e) => {
                    debug!("{e}");
                }
            }
        }

        trace!("No candidate matched {} bytes", bytes.len());
        Classification::NotRecognized
    }

    /// Classify a possibly absent buffer; `None` is not recognized.
    pub fn classify_opt(&self, bytes: Option<&[u8]>) -> Classification {
        match bytes {
            Some(bytes) => self.classify(bytes),
            None => Classification::NotRecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::CodedOutputStream;
    use social_types::{encode_envelope, encode_root, CommunityInfo, Envelope, TeamInfo, UnionInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Candidate with a fixed answer that counts its invocations.
    struct Scripted {
        id: SchemaId,
        answer: fn() -> Result<Option<DecodedRoot>>,
        calls: Arc<AtomicUsize>,
    }

    impl SchemaCandidate for Scripted {
        fn id(&self) -> SchemaId {
            self.id
        }

        fn message_type(&self) -> &str {
            "Scripted"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Option<DecodedRoot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn scripted(
        id: SchemaId,
        answer: fn() -> Result<Option<DecodedRoot>>,
    ) -> (Box<dyn SchemaCandidate>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let candidate = Scripted {
            id,
            answer,
            calls: Arc::clone(&calls),
        };
        (Box::new(candidate), calls)
    }

    fn accept() -> Result<Option<DecodedRoot>> {
        Ok(Some(DecodedRoot::default()))
    }

    fn absent() -> Result<Option<DecodedRoot>> {
        Ok(None)
    }

    fn reject() -> Result<Option<DecodedRoot>> {
        Err(Error::SchemaMismatch {
            schema: SchemaId::Envelope,
            reason: "scripted".to_string(),
        })
    }

    fn classifier() -> Classifier {
        Classifier::from_config(&ClassifierConfig::default()).expect("default classifier")
    }

    fn team_root() -> DecodedRoot {
        DecodedRoot {
            team: Some(TeamInfo {
                team_id: 501,
                leader_uid: 10001,
                member_uid_list: vec![10001, 10002],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_invokes_no_candidate() {
        let (first, first_calls) = scripted(SchemaId::Envelope, accept);
        let (second, second_calls) = scripted(SchemaId::Bare, accept);
        let classifier = Classifier::new(vec![first, second]);

        assert_eq!(classifier.classify(&[]), Classification::NotRecognized);
        assert_eq!(classifier.classify_opt(None), Classification::NotRecognized);
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_first_accepting_candidate_short_circuits() {
        let (first, first_calls) = scripted(SchemaId::Envelope, accept);
        let (second, second_calls) = scripted(SchemaId::Bare, accept);
        let classifier = Classifier::new(vec![first, second]);

        let result = classifier.classify(&[0x01]);
        assert_eq!(result.matched().unwrap().schema, SchemaId::Envelope);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_absent_inner_field_falls_through() {
        let (first, first_calls) = scripted(SchemaId::Envelope, absent);
        let (second, second_calls) = scripted(SchemaId::Bare, reject);
        let classifier = Classifier::new(vec![first, second]);

        assert_eq!(classifier.classify(&[0x01]), Classification::NotRecognized);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_absent_inner_field_then_accepting_candidate() {
        let (first, first_calls) = scripted(SchemaId::Envelope, absent);
        let (second, second_calls) = scripted(SchemaId::Bare, accept);
        let classifier = Classifier::new(vec![first, second]);

        let result = classifier.classify(&[0x01]).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Bare);
        assert_eq!(result.root, DecodedRoot::default());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mismatch_falls_through_to_next_candidate() {
        let (first, _) = scripted(SchemaId::Envelope, reject);
        let (second, second_calls) = scripted(SchemaId::Bare, accept);
        let classifier = Classifier::new(vec![first, second]);

        let result = classifier.classify(&[0x01]);
        assert_eq!(result.matched().unwrap().schema, SchemaId::Bare);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bare_encoding_matches_bare_schema() {
        let root = team_root();
        let bytes = encode_root(&root).unwrap();

        let result = classifier().classify(&bytes).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Bare);
        assert_eq!(result.message_type, BARE_MESSAGE);
        assert_eq!(result.root, root);
    }

    #[test]
    fn test_envelope_encoding_matches_envelope_schema() {
        let root = DecodedRoot {
            union_info: Some(UnionInfo {
                union_id: 7,
                name: "Alpha".to_string(),
                rank: 3,
            }),
            community: Some(CommunityInfo {
                community_id: 40,
                homeland_id: 41,
                cohabitant_uid_list: vec![1, 2, 3],
            }),
            ..team_root()
        };
        let bytes = encode_envelope(&Envelope {
            retcode: 0,
            player_uid: 10001,
            request_seq: 12,
            social_info: Some(root.clone()),
        })
        .unwrap();

        let result = classifier().classify(&bytes).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Envelope);
        assert_eq!(result.message_type, ENVELOPE_MESSAGE);
        assert_eq!(result.root, root);
    }

    #[test]
    fn test_envelope_with_empty_inner_structure_is_accepted() {
        let bytes = encode_envelope(&Envelope {
            retcode: 0,
            social_info: Some(DecodedRoot::default()),
            ..Default::default()
        })
        .unwrap();

        let result = classifier().classify(&bytes).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Envelope);
        assert_eq!(result.root, DecodedRoot::default());
    }

    #[test]
    fn test_envelope_without_inner_field_is_not_recognized() {
        // decodes as an envelope (retcode only) but is not a valid bare message
        let bytes = encode_envelope(&Envelope {
            retcode: 5,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(classifier().classify(&bytes), Classification::NotRecognized);
    }

    #[test]
    fn test_unknown_fields_only_match_bare_with_all_sections_absent() {
        // field 5 varint exists in neither message
        let result = classifier()
            .classify(&[0x28, 0x01])
            .into_match()
            .expect("recognized");
        assert_eq!(result.schema, SchemaId::Bare);
        assert_eq!(result.root, DecodedRoot::default());
    }

    #[test]
    fn test_split_team_records_are_merged() {
        // team { team_id: 1 } followed by team { leader_uid: 2 }
        let bytes = [0x0a, 0x02, 0x08, 0x01, 0x0a, 0x02, 0x10, 0x02];

        let result = classifier().classify(&bytes).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Bare);
        let team = result.root.team.expect("team present");
        assert_eq!(team.team_id, 1);
        assert_eq!(team.leader_uid, 2);
        assert!(result.root.union_info.is_none());
        assert!(result.root.community.is_none());
    }

    #[test]
    fn test_garbage_is_not_recognized() {
        let classifier = classifier();
        assert!(!classifier.classify(&[0xff, 0xff, 0xff]).is_recognized());
        assert!(!classifier.classify(&[0x00]).is_recognized());
        // team length prefix longer than the buffer
        assert!(!classifier.classify(&[0x0a, 0x10, 0x08]).is_recognized());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let bytes = encode_root(&team_root()).unwrap();
        let classifier = classifier();
        assert_eq!(classifier.classify(&bytes), classifier.classify(&bytes));
    }

    #[test]
    fn test_custom_proto_file_and_names() {
        use std::io::Write;

        let proto = r#"
            syntax = "proto3";
            package alt;

            message TeamInfo { uint32 team_id = 1; }
            message UnionInfo { uint64 union_id = 1; string name = 2; uint32 rank = 3; }
            message CommunityInfo { uint64 community_id = 1; }
            message Snapshot {
                TeamInfo team = 1;
                UnionInfo union_info = 2;
                CommunityInfo community = 3;
            }
            message SnapshotNotify {
                uint64 server_time = 1;
                Snapshot snapshot = 2;
            }
        "#;
        let mut file = tempfile::Builder::new()
            .suffix(".proto")
            .tempfile()
            .expect("temp proto");
        file.write_all(proto.as_bytes()).expect("write proto");

        let config = ClassifierConfig {
            proto_file: Some(file.path().to_path_buf()),
            envelope_type: "SnapshotNotify".to_string(),
            bare_type: "Snapshot".to_string(),
            envelope_field: "snapshot".to_string(),
        };
        let classifier = Classifier::from_config(&config).expect("custom classifier");
        let ids: Vec<SchemaId> = classifier.candidates().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![SchemaId::Envelope, SchemaId::Bare]);

        let mut snapshot = Vec::new();
        {
            let mut s = CodedOutputStream::vec(&mut snapshot);
            s.write_bytes(2, &[0x18, 0x03]).unwrap(); // union_info { rank: 3 }
            s.flush().unwrap();
        }
        let mut notify = Vec::new();
        {
            let mut s = CodedOutputStream::vec(&mut notify);
            s.write_uint64(1, 1_700_000_000).unwrap();
            s.write_bytes(2, &snapshot).unwrap();
            s.flush().unwrap();
        }

        let result = classifier.classify(&notify).into_match().expect("recognized");
        assert_eq!(result.schema, SchemaId::Envelope);
        assert_eq!(result.message_type, "SnapshotNotify");
        assert_eq!(result.root.union_info.unwrap().rank, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClassifierConfig {
            envelope_field: "request_seq".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Classifier::from_config(&config),
            Err(Error::InvalidEnvelopeField { .. })
        ));

        let config = ClassifierConfig {
            bare_type: "GuildInfo".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Classifier::from_config(&config),
            Err(Error::Schema(_))
        ));
    }
}
