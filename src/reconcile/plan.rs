use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{LiveStatus, PlaylistItem, PrivacyStatus, VideoStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixPolicy {
    pub min_duration_seconds: u64,
    pub retention_days: i64,
}

impl Default for MixPolicy {
    fn default() -> Self {
        Self {
            min_duration_seconds: 600,
            retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub to_add: Vec<PlaylistItem>,
    pub to_remove: Vec<PlaylistItem>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChange {
    pub item_id: String,
    pub video_id: String,
    pub from: usize,
    pub to: usize,
}

/// Candidates whose video is neither in the playlist nor an earlier candidate.
fn fresh_candidates(
    current: &[PlaylistItem],
    candidates: Vec<PlaylistItem>,
) -> impl Iterator<Item = PlaylistItem> {
    let mut seen: HashSet<String> = current.iter().map(|i| i.video_id.clone()).collect();
    candidates
        .into_iter()
        .filter(move |c| seen.insert(c.video_id.clone()))
}

/// Lives playlist: drop anything private or not broadcasting, add what is new.
///
/// A current item without stats (deleted video) counts as not broadcasting.
pub fn plan_live(
    current: &[PlaylistItem],
    stats: &HashMap<String, VideoStats>,
    candidates: Vec<PlaylistItem>,
) -> Plan {
    let to_remove = current
        .iter()
        .filter(|item| {
            let live_status = stats.get(&item.video_id).map(|s| s.live_status);
            item.status.is_private_like() || live_status != Some(LiveStatus::Live)
        })
        .cloned()
        .collect();

    Plan {
        to_add: fresh_candidates(current, candidates).collect(),
        to_remove,
    }
}

/// Mixes playlist: drop private items and those released before the retention
/// cutoff, add new candidates that are long enough and not a pending premiere.
///
/// The cutoff itself is kept. Items without a release date are only ever
/// removed for being private. Candidates without stats are not added.
pub fn plan_mix(
    current: &[PlaylistItem],
    candidates: Vec<PlaylistItem>,
    candidate_stats: &HashMap<String, VideoStats>,
    policy: &MixPolicy,
    reference_time: DateTime<Utc>,
) -> Plan {
    let cutoff = reference_time - TimeDelta::days(policy.retention_days);

    let to_remove = current
        .iter()
        .filter(|item| {
            item.status == PrivacyStatus::Private
                || item.release_date.is_some_and(|d| d < cutoff)
        })
        .cloned()
        .collect();

    let to_add = fresh_candidates(current, candidates)
        .filter(|c| {
            candidate_stats.get(&c.video_id).is_some_and(|s| {
                s.duration_seconds >= policy.min_duration_seconds
                    && s.live_status != LiveStatus::Upcoming
            })
        })
        .collect();

    Plan { to_add, to_remove }
}

/// Rank by concurrent viewers, then total views, both descending, keeping the
/// current order on ties.
///
/// Moves are remove-and-insert, so they are replayed on a local copy of the
/// playlist: walking ranks in ascending order, an item is moved only when its
/// position in the copy differs from its rank. `from` is that position at the
/// time of the move. Applying the changes in order yields the ranked playlist.
pub fn plan_live_order(
    items: &[PlaylistItem],
    stats: &HashMap<String, VideoStats>,
) -> Vec<PositionChange> {
    let mut ranked: Vec<(usize, &PlaylistItem)> = items.iter().enumerate().collect();

    ranked.sort_by_key(|(position, item)| {
        let (viewers, views) = stats
            .get(&item.video_id)
            .map(|s| (s.concurrent_viewers.unwrap_or(0), s.views))
            .unwrap_or((0, 0));
        (Reverse(viewers), Reverse(views), *position)
    });

    let mut order: Vec<usize> = (0..items.len()).collect();
    let mut changes = Vec::new();

    for (rank, (original, item)) in ranked.into_iter().enumerate() {
        let Some(position) = order.iter().position(|&i| i == original) else {
            continue;
        };
        if position == rank {
            continue;
        }

        order.remove(position);
        order.insert(rank, original);
        changes.push(PositionChange {
            item_id: item.item_id.clone(),
            video_id: item.video_id.clone(),
            from: position,
            to: rank,
        });
    }
    changes
}
