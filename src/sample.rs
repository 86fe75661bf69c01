//! Built-in demonstration buffers.

use anyhow::{Context, Result};
use clap::ValueEnum;
use social_types::{
    encode_envelope, encode_root, CommunityInfo, DecodedRoot, Envelope, SocialData, TeamInfo,
    TeamMemberInfo, UnionInfo,
};
use std::collections::HashMap;

/// Which shape to encode the demonstration root as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SampleSchema {
    /// Wrapped in the reply envelope
    #[value(name = "envelope")]
    Envelope,
    /// The structure encoded directly
    #[value(name = "bare")]
    Bare,
}

/// A two-member team with a union and an empty community.
pub fn demo_root() -> DecodedRoot {
    let mut member_info_map = HashMap::new();
    member_info_map.insert(
        10001,
        TeamMemberInfo {
            enter_time: 1_700_000_000,
            is_online: true,
            scene_id: 3,
            talent_id: 0,
            is_voice_open: true,
            group_id: 0,
            social_data: Some(SocialData {
                uid: 10001,
                nickname: "Traveler".to_string(),
                level: 60,
                team: None,
            }),
        },
    );
    member_info_map.insert(
        10002,
        TeamMemberInfo {
            enter_time: 1_700_000_120,
            is_online: false,
            scene_id: 3,
            talent_id: 2,
            is_voice_open: false,
            group_id: 0,
            social_data: None,
        },
    );

    DecodedRoot {
        team: Some(TeamInfo {
            team_id: 501,
            leader_uid: 10001,
            target_id: 0,
            member_count: 2,
            is_matching: false,
            version: 3,
            member_uid_list: vec![10001, 10002],
            member_info_map,
        }),
        union_info: Some(UnionInfo {
            union_id: 7,
            name: "Alpha".to_string(),
            rank: 3,
        }),
        community: Some(CommunityInfo {
            community_id: 40,
            homeland_id: 41,
            cohabitant_uid_list: vec![],
        }),
    }
}

pub fn demo_envelope() -> Envelope {
    Envelope {
        retcode: 0,
        player_uid: 10001,
        request_seq: 12,
        social_info: Some(demo_root()),
    }
}

/// Encode the demonstration root with the embedded schema.
pub fn encode_sample(schema: SampleSchema) -> Result<Vec<u8>> {
    match schema {
        SampleSchema::Envelope => {
            encode_envelope(&demo_envelope()).context("Failed to encode sample envelope")
        }
        SampleSchema::Bare => encode_root(&demo_root()).context("Failed to encode sample root"),
    }
}
