//! Typed player social model.
//!
//! Every structure here is built fresh from one decoded buffer and never
//! mutated afterwards. Optional substructures are `Option`s: absence is an
//! ordinary state, not an error.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Root of a successfully decoded buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedRoot {
    pub team: Option<TeamInfo>,
    pub union_info: Option<UnionInfo>,
    pub community: Option<CommunityInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamInfo {
    pub team_id: u32,
    pub leader_uid: u32,
    pub target_id: u32,
    pub member_count: u32,
    pub is_matching: bool,
    pub version: u32,
    /// Member uids in wire order
    pub member_uid_list: Vec<u32>,
    /// Per-member detail keyed by member uid
    #[serde(serialize_with = "serialize_sorted")]
    pub member_info_map: HashMap<u32, TeamMemberInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamMemberInfo {
    pub enter_time: u64,
    pub is_online: bool,
    pub scene_id: u32,
    pub talent_id: u32,
    pub is_voice_open: bool,
    pub group_id: u32,
    pub social_data: Option<SocialData>,
}

/// Social card attached to a team member.
///
/// May itself carry a team, so the model is self-referential.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocialData {
    pub uid: u32,
    pub nickname: String,
    pub level: u32,
    pub team: Option<Box<TeamInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnionInfo {
    pub union_id: u64,
    pub name: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityInfo {
    pub community_id: u64,
    pub homeland_id: u64,
    /// Cohabitant uids in wire order
    pub cohabitant_uid_list: Vec<u32>,
}

impl CommunityInfo {
    pub fn cohabitant_count(&self) -> usize {
        self.cohabitant_uid_list.len()
    }
}

/// Reply envelope wrapping a [`DecodedRoot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    pub retcode: i32,
    pub player_uid: u32,
    pub request_seq: u32,
    pub social_info: Option<DecodedRoot>,
}

/// Serialize a map with its keys in ascending order so JSON output is stable.
fn serialize_sorted<S, K, V>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Ord + Serialize,
    V: Serialize,
{
    let sorted: BTreeMap<&K, &V> = map.iter().collect();
    sorted.serialize(serializer)
}
