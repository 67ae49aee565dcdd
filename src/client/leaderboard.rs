use super::history::RecentHistory;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub member: String,
    pub total_minutes: u64,
    pub entries: u32,
}

/// Totals per member, highest first; ties go alphabetically.
pub fn build_leaderboard(history: &RecentHistory) -> Vec<LeaderboardRow> {
    let mut totals: BTreeMap<&str, (u64, u32)> = BTreeMap::new();
    for entry in &history.entries {
        let (minutes, count) = totals.entry(entry.member.as_str()).or_default();
        *minutes = minutes.saturating_add(u64::from(entry.duration));
        *count = count.saturating_add(1);
    }

    let mut rows: Vec<LeaderboardRow> = totals
        .into_iter()
        .map(|(member, (total_minutes, entries))| LeaderboardRow {
            member: member.to_string(),
            total_minutes,
            entries,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_minutes
            .cmp(&a.total_minutes)
            .then_with(|| a.member.cmp(&b.member))
    });
    rows
}
