//! Reverse conversion: decoded protobuf message → typed model.
//!
//! Absent scalar fields take their proto3 defaults (0, false, empty string,
//! empty list/map) and absent message fields become `None`. A field whose
//! decoded value has an unexpected shape is a conversion error.

use crate::error::{Result, SocialTypesError};
use crate::model::{
    CommunityInfo, DecodedRoot, SocialData, TeamInfo, TeamMemberInfo, UnionInfo,
};
use social_proto::{ProtoFieldValue, ProtoMessage, ProtoType};
use std::collections::HashMap;
use tracing::trace;

/// Convert a decoded `PlayerSocialInfo` message to a [`DecodedRoot`].
pub fn root_from_message(msg: &ProtoMessage) -> Result<DecodedRoot> {
    Ok(DecodedRoot {
        team: get_message(msg, "team")?.map(team_from_message).transpose()?,
        union_info: get_message(msg, "union_info")?
            .map(union_from_message)
            .transpose()?,
        community: get_message(msg, "community")?
            .map(community_from_message)
            .transpose()?,
    })
}

/// Extract the wrapped root from a decoded envelope.
///
/// Returns `Ok(None)` when the envelope decoded but does not carry `field`.
pub fn extract_root(envelope: &ProtoMessage, field: &str) -> Result<Option<DecodedRoot>> {
    match get_message(envelope, field)? {
        Some(inner) => root_from_message(inner).map(Some),
        None => {
            trace!(
                "Envelope {} has no '{}' field",
                envelope.message_type,
                field
            );
            Ok(None)
        }
    }
}

pub fn team_from_message(msg: &ProtoMessage) -> Result<TeamInfo> {
    let mut member_info_map = HashMap::new();
    for (key, value) in get_map(msg, "member_info_map")? {
        let uid = expect_u32("member_info_map.key", key)?;
        let member = match value {
            ProtoFieldValue::Message(m) => member_from_message(m)?,
            ProtoFieldValue::Null => TeamMemberInfo::default(),
            other => return Err(mismatch("member_info_map.value", message_type(), other)),
        };
        // last entry wins for duplicate keys, as in protobuf map semantics
        member_info_map.insert(uid, member);
    }

    Ok(TeamInfo {
        team_id: get_u32(msg, "team_id")?,
        leader_uid: get_u32(msg, "leader_uid")?,
        target_id: get_u32(msg, "target_id")?,
        member_count: get_u32(msg, "member_count")?,
        is_matching: get_bool(msg, "is_matching")?,
        version: get_u32(msg, "version")?,
        member_uid_list: get_u32_list(msg, "member_uid_list")?,
        member_info_map,
    })
}

pub fn member_from_message(msg: &ProtoMessage) -> Result<TeamMemberInfo> {
    Ok(TeamMemberInfo {
        enter_time: get_u64(msg, "enter_time")?,
        is_online: get_bool(msg, "is_online")?,
        scene_id: get_u32(msg, "scene_id")?,
        talent_id: get_u32(msg, "talent_id")?,
        is_voice_open: get_bool(msg, "is_voice_open")?,
        group_id: get_u32(msg, "group_id")?,
        social_data: get_message(msg, "social_data")?
            .map(social_data_from_message)
            .transpose()?,
    })
}

pub fn social_data_from_message(msg: &ProtoMessage) -> Result<SocialData> {
    Ok(SocialData {
        uid: get_u32(msg, "uid")?,
        nickname: get_string(msg, "nickname")?,
        level: get_u32(msg, "level")?,
        team: get_message(msg, "team")?
            .map(|t| team_from_message(t).map(Box::new))
            .transpose()?,
    })
}

pub fn union_from_message(msg: &ProtoMessage) -> Result<UnionInfo> {
    Ok(UnionInfo {
        union_id: get_u64(msg, "union_id")?,
        name: get_string(msg, "name")?,
        rank: get_u32(msg, "rank")?,
    })
}

pub fn community_from_message(msg: &ProtoMessage) -> Result<CommunityInfo> {
    Ok(CommunityInfo {
        community_id: get_u64(msg, "community_id")?,
        homeland_id: get_u64(msg, "homeland_id")?,
        cohabitant_uid_list: get_u32_list(msg, "cohabitant_uid_list")?,
    })
}

fn message_type() -> ProtoType {
    ProtoType::Message(String::new())
}

fn mismatch(field: &str, expected: ProtoType, actual: &ProtoFieldValue) -> SocialTypesError {
    SocialTypesError::TypeConversion {
        field: field.to_string(),
        expected,
        actual: actual.proto_field_type(),
    }
}

fn expect_u32(field: &str, value: &ProtoFieldValue) -> Result<u32> {
    match value {
        ProtoFieldValue::Uint32(v) => Ok(*v),
        other => Err(mismatch(field, ProtoType::Uint32, other)),
    }
}

fn get_u32(msg: &ProtoMessage, field: &str) -> Result<u32> {
    msg.field(field).map_or(Ok(0), |v| expect_u32(field, v))
}

fn get_u64(msg: &ProtoMessage, field: &str) -> Result<u64> {
    match msg.field(field) {
        None => Ok(0),
        Some(ProtoFieldValue::Uint64(v)) => Ok(*v),
        Some(ProtoFieldValue::Uint32(v)) => Ok(u64::from(*v)),
        Some(other) => Err(mismatch(field, ProtoType::Uint64, other)),
    }
}

fn get_bool(msg: &ProtoMessage, field: &str) -> Result<bool> {
    match msg.field(field) {
        None => Ok(false),
        Some(ProtoFieldValue::Bool(v)) => Ok(*v),
        Some(other) => Err(mismatch(field, ProtoType::Bool, other)),
    }
}

fn get_string(msg: &ProtoMessage, field: &str) -> Result<String> {
    match msg.field(field) {
        None => Ok(String::new()),
        Some(ProtoFieldValue::String(v)) => Ok(v.clone()),
        Some(other) => Err(mismatch(field, ProtoType::String, other)),
    }
}

fn get_message<'a>(msg: &'a ProtoMessage, field: &str) -> Result<Option<&'a ProtoMessage>> {
    match msg.field(field) {
        None | Some(ProtoFieldValue::Null) => Ok(None),
        Some(ProtoFieldValue::Message(m)) => Ok(Some(m)),
        Some(other) => Err(mismatch(field, message_type(), other)),
    }
}

fn get_u32_list(msg: &ProtoMessage, field: &str) -> Result<Vec<u32>> {
    match msg.field(field) {
        None => Ok(Vec::new()),
        Some(ProtoFieldValue::Repeated(values)) => {
            values.iter().map(|v| expect_u32(field, v)).collect()
        }
        Some(other) => Err(mismatch(
            field,
            ProtoType::Repeated(Box::new(ProtoType::Uint32)),
            other,
        )),
    }
}

fn get_map<'a>(
    msg: &'a ProtoMessage,
    field: &str,
) -> Result<&'a [(ProtoFieldValue, ProtoFieldValue)]> {
    match msg.field(field) {
        None => Ok(&[]),
        Some(ProtoFieldValue::Map(entries)) => Ok(entries),
        Some(other) => Err(mismatch(field, ProtoType::Map, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{social_decoder, BARE_MESSAGE, ENVELOPE_FIELD, ENVELOPE_MESSAGE};
    use protobuf::CodedOutputStream;

    fn encode(f: impl FnOnce(&mut CodedOutputStream)) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut stream = CodedOutputStream::vec(&mut buffer);
            f(&mut stream);
            stream.flush().expect("flush");
        }
        buffer
    }

    #[test]
    fn test_absent_sections_are_none() {
        let decoder = social_decoder().unwrap();
        let msg = decoder.decode(BARE_MESSAGE, &[]).unwrap();

        let root = root_from_message(&msg).expect("convert");
        assert_eq!(root, DecodedRoot::default());
    }

    #[test]
    fn test_empty_team_takes_proto3_defaults() {
        let decoder = social_decoder().unwrap();
        // team present but empty
        let bytes = encode(|s| s.write_bytes(1, &[]).unwrap());
        let msg = decoder.decode(BARE_MESSAGE, &bytes).unwrap();

        let root = root_from_message(&msg).expect("convert");
        assert_eq!(root.team, Some(TeamInfo::default()));
        assert!(root.union_info.is_none());
        assert!(root.community.is_none());
    }

    #[test]
    fn test_union_and_community_fields() {
        let decoder = social_decoder().unwrap();
        let union_bytes = encode(|s| {
            s.write_uint64(1, 7).unwrap();
            s.write_string(2, "Alpha").unwrap();
            s.write_uint32(3, 3).unwrap();
        });
        let community_bytes = encode(|s| {
            s.write_uint64(1, 900).unwrap();
            s.write_uint64(2, 901).unwrap();
            s.write_uint32(3, 12).unwrap();
            s.write_uint32(3, 11).unwrap();
        });
        let bytes = encode(|s| {
            s.write_bytes(2, &union_bytes).unwrap();
            s.write_bytes(3, &community_bytes).unwrap();
        });

        let msg = decoder.decode(BARE_MESSAGE, &bytes).unwrap();
        let root = root_from_message(&msg).expect("convert");

        assert_eq!(
            root.union_info,
            Some(UnionInfo {
                union_id: 7,
                name: "Alpha".to_string(),
                rank: 3,
            })
        );
        let community = root.community.expect("community present");
        assert_eq!(community.community_id, 900);
        assert_eq!(community.homeland_id, 901);
        assert_eq!(community.cohabitant_uid_list, vec![12, 11]);
    }

    #[test]
    fn test_member_map_and_nested_social_data() {
        let decoder = social_decoder().unwrap();
        let social = encode(|s| {
            s.write_uint32(1, 5).unwrap();
            s.write_string(2, "kai").unwrap();
        });
        let member = encode(|s| {
            s.write_uint64(1, 1_700_000_000).unwrap();
            s.write_bool(2, true).unwrap();
            s.write_uint32(3, 3).unwrap();
            s.write_bytes(7, &social).unwrap();
        });
        let entry = encode(|s| {
            s.write_uint32(1, 5).unwrap();
            s.write_bytes(2, &member).unwrap();
        });
        let team = encode(|s| {
            s.write_uint32(1, 42).unwrap();
            s.write_bytes(8, &entry).unwrap();
        });
        let bytes = encode(|s| s.write_bytes(1, &team).unwrap());

        let msg = decoder.decode(BARE_MESSAGE, &bytes).unwrap();
        let team = root_from_message(&msg).unwrap().team.expect("team");

        assert_eq!(team.team_id, 42);
        let member = &team.member_info_map[&5];
        assert_eq!(member.enter_time, 1_700_000_000);
        assert!(member.is_online);
        assert_eq!(member.scene_id, 3);
        let social = member.social_data.as_ref().expect("social data");
        assert_eq!(social.nickname, "kai");
        assert!(social.team.is_none());
    }

    #[test]
    fn test_extract_root_from_envelope() {
        let decoder = social_decoder().unwrap();

        let without = encode(|s| s.write_int32(1, -1).unwrap());
        let msg = decoder.decode(ENVELOPE_MESSAGE, &without).unwrap();
        assert_eq!(extract_root(&msg, ENVELOPE_FIELD).unwrap(), None);

        let with = encode(|s| {
            s.write_int32(1, 0).unwrap();
            s.write_bytes(4, &[]).unwrap();
        });
        let msg = decoder.decode(ENVELOPE_MESSAGE, &with).unwrap();
        assert_eq!(
            extract_root(&msg, ENVELOPE_FIELD).unwrap(),
            Some(DecodedRoot::default())
        );
    }

    #[test]
    fn test_extract_root_rejects_scalar_field() {
        let decoder = social_decoder().unwrap();
        let bytes = encode(|s| s.write_uint32(2, 10001).unwrap());
        let msg = decoder.decode(ENVELOPE_MESSAGE, &bytes).unwrap();

        let err = extract_root(&msg, "player_uid").unwrap_err();
        assert!(matches!(
            err,
            SocialTypesError::TypeConversion { ref field, .. } if field == "player_uid"
        ));
    }
}
