//! End-to-end: encode, classify, render.

use social_core::{render, Classifier, ClassifierConfig, SchemaId, WriterSink};
use social_probe::input::{decode_text, encode_text};
use social_probe::output::text_lines;
use social_probe::{
    demo_root, encode_sample, parse_batch, BatchSummary, InputEncoding, SampleSchema,
};
use social_types::{encode_envelope, encode_root, DecodedRoot, Envelope, UnionInfo};

fn classifier() -> Classifier {
    Classifier::from_config(&ClassifierConfig::default()).expect("default classifier")
}

const DEMO_REPORT: &[&str] = &[
    "team:",
    "  team_id: 501",
    "  leader_uid: 10001",
    "  target_id: 0",
    "  member_count: 2",
    "  is_matching: false",
    "  version: 3",
    "  member_uid_list: 10001, 10002",
    "  member 10001:",
    "    enter_time: 1700000000",
    "    is_online: true",
    "    scene_id: 3",
    "    talent_id: 0",
    "    is_voice_open: true",
    "    group_id: 0",
    "    social_data: present",
    "  member 10002:",
    "    enter_time: 1700000120",
    "    is_online: false",
    "    scene_id: 3",
    "    talent_id: 2",
    "    is_voice_open: false",
    "    group_id: 0",
    "    social_data: absent",
    "union:",
    "  union_id: 7",
    "  name: Alpha",
    "  rank: 3",
    "community:",
    "  community_id: 40",
    "  homeland_id: 41",
    "  cohabitant_count: 0",
];

#[test]
fn test_envelope_sample_full_report() {
    let bytes = encode_sample(SampleSchema::Envelope).unwrap();
    let classification = classifier().classify(&bytes);

    let lines = text_lines(&classification);
    assert_eq!(lines[0], "schema: envelope (PlayerSocialInfoRsp)");
    assert_eq!(lines[1..], *DEMO_REPORT);
}

#[test]
fn test_bare_sample_full_report() {
    let bytes = encode_sample(SampleSchema::Bare).unwrap();
    let classification = classifier().classify(&bytes);

    let lines = text_lines(&classification);
    assert_eq!(lines[0], "schema: bare (PlayerSocialInfo)");
    assert_eq!(lines[1..], *DEMO_REPORT);
}

#[test]
fn test_union_only_buffer_through_hex() {
    let root = DecodedRoot {
        union_info: Some(UnionInfo {
            union_id: 7,
            name: "Alpha".to_string(),
            rank: 3,
        }),
        ..Default::default()
    };
    let text = encode_text(InputEncoding::Hex, &encode_root(&root).unwrap());
    let bytes = decode_text(InputEncoding::Hex, &format!("0x{text}")).unwrap();

    let matched = classifier().classify(&bytes).into_match().expect("recognized");
    assert_eq!(matched.schema, SchemaId::Bare);

    let mut out = WriterSink::new(Vec::new());
    render(&matched.root).emit(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out.into_inner()).unwrap(),
        "no team\nunion:\n  union_id: 7\n  name: Alpha\n  rank: 3\nno community\n"
    );
}

#[test]
fn test_envelope_without_inner_structure_is_not_recognized() {
    let bytes = encode_envelope(&Envelope {
        retcode: 0,
        player_uid: 10001,
        request_seq: 12,
        social_info: None,
    })
    .unwrap();

    let classification = classifier().classify(&bytes);
    assert!(!classification.is_recognized());
    assert_eq!(text_lines(&classification), ["not recognized"]);
}

#[test]
fn test_batch_of_mixed_buffers() {
    let envelope = encode_text(
        InputEncoding::Base64,
        &encode_sample(SampleSchema::Envelope).unwrap(),
    );
    let bare = encode_text(
        InputEncoding::Base64,
        &encode_sample(SampleSchema::Bare).unwrap(),
    );
    let contents = format!("# capture\n{envelope}\n\n{bare}\n//8=\n");

    let entries = parse_batch(&contents, InputEncoding::Base64).unwrap();
    assert_eq!(entries.len(), 3);

    let classifier = classifier();
    let mut summary = BatchSummary::default();
    let mut roots = Vec::new();
    for entry in &entries {
        let classification = classifier.classify(&entry.bytes);
        summary.record(&classification);
        if let Some(m) = classification.into_match() {
            roots.push(m.root);
        }
    }

    assert_eq!(summary.envelope, 1);
    assert_eq!(summary.bare, 1);
    assert_eq!(summary.not_recognized, 1);
    assert_eq!(roots, [demo_root(), demo_root()]);
}
