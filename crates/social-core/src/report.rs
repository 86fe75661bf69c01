//! Structured reporter.
//!
//! Walks a [`DecodedRoot`] in a fixed order and produces text lines:
//!
//! ```text
//! team:                      | no team
//!   team_id: 501
//!   leader_uid: 10001
//!   target_id: 0
//!   member_count: 2
//!   is_matching: false
//!   version: 3
//!   member_uid_list: 10002, 10001
//!   member 10001:
//!     enter_time: 1700000000
//!     is_online: true
//!     scene_id: 3
//!     talent_id: 0
//!     is_voice_open: false
//!     group_id: 0
//!     social_data: absent
//! union:                     | no union
//!   union_id: 7
//!   name: Alpha
//!   rank: 3
//! community:                 | no community
//!   community_id: 40
//!   homeland_id: 41
//!   cohabitant_count: 3
//!   cohabitant_uid_list: 1, 2, 3
//! ```
//!
//! Member details are emitted in ascending uid order whatever the map's own
//! iteration order. Nested social data is reported as present/absent only.

use crate::sink::LineSink;
use social_types::{CommunityInfo, DecodedRoot, TeamInfo, TeamMemberInfo, UnionInfo};
use std::fmt::Display;

const INDENT: &str = "  ";
const LIST_DELIMITER: &str = ", ";

/// Ordered report lines for one decoded root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write every line to `sink` in order.
    pub fn emit<S: LineSink + ?Sized>(&self, sink: &mut S) -> std::io::Result<()> {
        for line in &self.lines {
            sink.write_line(line)?;
        }
        Ok(())
    }

    fn push(&mut self, depth: usize, text: impl Display) {
        self.lines.push(format!("{}{text}", INDENT.repeat(depth)));
    }

    fn field(&mut self, depth: usize, name: &str, value: impl Display) {
        self.push(depth, format_args!("{name}: {value}"));
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Render a decoded root: team, union, community, in that order.
pub fn render(root: &DecodedRoot) -> Report {
    let mut report = Report::default();

    match &root.team {
        Some(team) => render_team(&mut report, team),
        None => report.push(0, "no team"),
    }
    match &root.union_info {
        Some(union_info) => render_union(&mut report, union_info),
        None => report.push(0, "no union"),
    }
    match &root.community {
        Some(community) => render_community(&mut report, community),
        None => report.push(0, "no community"),
    }

    report
}

fn render_team(report: &mut Report, team: &TeamInfo) {
    report.push(0, "team:");
    report.field(1, "team_id", team.team_id);
    report.field(1, "leader_uid", team.leader_uid);
    report.field(1, "target_id", team.target_id);
    report.field(1, "member_count", team.member_count);
    report.field(1, "is_matching", team.is_matching);
    report.field(1, "version", team.version);

    if !team.member_uid_list.is_empty() {
        report.field(1, "member_uid_list", join(&team.member_uid_list));
    }

    let mut uids: Vec<&u32> = team.member_info_map.keys().collect();
    uids.sort_unstable();
    for uid in uids {
        report.push(1, format_args!("member {uid}:"));
        render_member(report, &team.member_info_map[uid]);
    }
}

fn render_member(report: &mut Report, member: &TeamMemberInfo) {
    report.field(2, "enter_time", member.enter_time);
    report.field(2, "is_online", member.is_online);
    report.field(2, "scene_id", member.scene_id);
    report.field(2, "talent_id", member.talent_id);
    report.field(2, "is_voice_open", member.is_voice_open);
    report.field(2, "group_id", member.group_id);
    let presence = if member.social_data.is_some() {
        "present"
    } else {
        "absent"
    };
    report.field(2, "social_data", presence);
}

fn render_union(report: &mut Report, union_info: &UnionInfo) {
    report.push(0, "union:");
    report.field(1, "union_id", union_info.union_id);
    report.field(1, "name", &union_info.name);
    report.field(1, "rank", union_info.rank);
}

fn render_community(report: &mut Report, community: &CommunityInfo) {
    report.push(0, "community:");
    report.field(1, "community_id", community.community_id);
    report.field(1, "homeland_id", community.homeland_id);
    report.field(1, "cohabitant_count", community.cohabitant_count());
    if community.cohabitant_count() > 0 {
        report.field(1, "cohabitant_uid_list", join(&community.cohabitant_uid_list));
    }
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}
