//! Forward conversion: typed model → protobuf encoding.
//!
//! The encoding follows proto3 wire format:
//! - Each field is encoded as (tag, value) pairs
//! - Tag = (field_number << 3) | wire_type
//! - Scalars equal to their default are omitted
//! - Present message fields are always written, even when empty
//! - Repeated scalars are packed; map entries are written in key order

use crate::error::Result;
use crate::model::{
    CommunityInfo, DecodedRoot, Envelope, SocialData, TeamInfo, TeamMemberInfo, UnionInfo,
};
use protobuf::CodedOutputStream;

/// Encode a root as a bare `PlayerSocialInfo` message.
pub fn encode_root(root: &DecodedRoot) -> Result<Vec<u8>> {
    encode_with(|stream| write_root(stream, root))
}

/// Encode a `PlayerSocialInfoRsp` envelope.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>> {
    encode_with(|stream| {
        if envelope.retcode != 0 {
            stream.write_int32(1, envelope.retcode)?;
        }
        if envelope.player_uid != 0 {
            stream.write_uint32(2, envelope.player_uid)?;
        }
        if envelope.request_seq != 0 {
            stream.write_uint32(3, envelope.request_seq)?;
        }
        if let Some(root) = &envelope.social_info {
            write_nested(stream, 4, |s| write_root(s, root))?;
        }
        Ok(())
    })
}

fn encode_with<F>(f: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut CodedOutputStream) -> Result<()>,
{
    let mut buffer = Vec::new();
    {
        let mut stream = CodedOutputStream::vec(&mut buffer);
        f(&mut stream)?;
        stream.flush()?;
    }
    Ok(buffer)
}

/// Write a length-delimited embedded message.
fn write_nested<F>(stream: &mut CodedOutputStream, field_number: u32, f: F) -> Result<()>
where
    F: FnOnce(&mut CodedOutputStream) -> Result<()>,
{
    let nested = encode_with(f)?;
    stream.write_bytes(field_number, &nested)?;
    Ok(())
}

fn write_packed_u32(
    stream: &mut CodedOutputStream,
    field_number: u32,
    values: &[u32],
) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    let packed = encode_with(|s| {
        for v in values {
            s.write_raw_varint32(*v)?;
        }
        Ok(())
    })?;
    stream.write_bytes(field_number, &packed)?;
    Ok(())
}

fn write_root(stream: &mut CodedOutputStream, root: &DecodedRoot) -> Result<()> {
    if let Some(team) = &root.team {
        write_nested(stream, 1, |s| write_team(s, team))?;
    }
    if let Some(union_info) = &root.union_info {
        write_nested(stream, 2, |s| write_union(s, union_info))?;
    }
    if let Some(community) = &root.community {
        write_nested(stream, 3, |s| write_community(s, community))?;
    }
    Ok(())
}

fn write_team(stream: &mut CodedOutputStream, team: &TeamInfo) -> Result<()> {
    let scalars = [
        (1, team.team_id),
        (2, team.leader_uid),
        (3, team.target_id),
        (4, team.member_count),
    ];
    for (field_number, value) in scalars {
        if value != 0 {
            stream.write_uint32(field_number, value)?;
        }
    }
    if team.is_matching {
        stream.write_bool(5, true)?;
    }
    if team.version != 0 {
        stream.write_uint32(6, team.version)?;
    }
    write_packed_u32(stream, 7, &team.member_uid_list)?;

    let mut keys: Vec<&u32> = team.member_info_map.keys().collect();
    keys.sort();
    for key in keys {
        let member = &team.member_info_map[key];
        write_nested(stream, 8, |s| {
            if *key != 0 {
                s.write_uint32(1, *key)?;
            }
            write_nested(s, 2, |m| write_member(m, member))
        })?;
    }
    Ok(())
}

fn write_member(stream: &mut CodedOutputStream, member: &TeamMemberInfo) -> Result<()> {
    if member.enter_time != 0 {
        stream.write_uint64(1, member.enter_time)?;
    }
    if member.is_online {
        stream.write_bool(2, true)?;
    }
    if member.scene_id != 0 {
        stream.write_uint32(3, member.scene_id)?;
    }
    if member.talent_id != 0 {
        stream.write_uint32(4, member.talent_id)?;
    }
    if member.is_voice_open {
        stream.write_bool(5, true)?;
    }
    if member.group_id != 0 {
        stream.write_uint32(6, member.group_id)?;
    }
    if let Some(social) = &member.social_data {
        write_nested(stream, 7, |s| write_social_data(s, social))?;
    }
    Ok(())
}

fn write_social_data(stream: &mut CodedOutputStream, social: &SocialData) -> Result<()> {
    if social.uid != 0 {
        stream.write_uint32(1, social.uid)?;
    }
    if !social.nickname.is_empty() {
        stream.write_string(2, &social.nickname)?;
    }
    if social.level != 0 {
        stream.write_uint32(3, social.level)?;
    }
    if let Some(team) = &social.team {
        write_nested(stream, 4, |s| write_team(s, team))?;
    }
    Ok(())
}

fn write_union(stream: &mut CodedOutputStream, union_info: &UnionInfo) -> Result<()> {
    if union_info.union_id != 0 {
        stream.write_uint64(1, union_info.union_id)?;
    }
    if !union_info.name.is_empty() {
        stream.write_string(2, &union_info.name)?;
    }
    if union_info.rank != 0 {
        stream.write_uint32(3, union_info.rank)?;
    }
    Ok(())
}

fn write_community(stream: &mut CodedOutputStream, community: &CommunityInfo) -> Result<()> {
    if community.community_id != 0 {
        stream.write_uint64(1, community.community_id)?;
    }
    if community.homeland_id != 0 {
        stream.write_uint64(2, community.homeland_id)?;
    }
    write_packed_u32(stream, 3, &community.cohabitant_uid_list)
}
