//! Decides what each curated playlist should hold and moves it there.

mod mutator;
mod plan;

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::Result;
use crate::fetch::{get_playlist_items, get_stats_by_id, get_subscribers, TimeWindow};
use crate::models::{HistoryRecord, LiveCandidate, PlaylistItem};
use crate::store::HistorySink;
use crate::youtube::PlaylistApi;

use mutator::ItemMutator;
use plan::{plan_live, plan_live_order, plan_mix};

pub use plan::{MixPolicy, Plan};

/// Everything a run depends on besides the API: the clock, the previous run
/// and the mix policy.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub reference_time: DateTime<Utc>,
    pub last_execution: Option<DateTime<Utc>>,
    pub policy: MixPolicy,
    pub show_progress: bool,
}

impl RunContext {
    /// Release dates worth collecting: since the previous run, or over the
    /// whole retention period when there is no record of one.
    pub fn fetch_window(&self) -> TimeWindow {
        let after = self.last_execution.unwrap_or_else(|| {
            self.reference_time - TimeDelta::days(self.policy.retention_days)
        });
        TimeWindow::new(after, self.reference_time)
    }
}

fn video_ids(items: &[PlaylistItem]) -> Vec<String> {
    items.iter().map(|i| i.video_id.clone()).collect()
}

pub struct Reconciler<'a, A: PlaylistApi + ?Sized> {
    api: &'a A,
    ctx: &'a RunContext,
}

impl<'a, A: PlaylistApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A, ctx: &'a RunContext) -> Self {
        Self { api, ctx }
    }

    fn mutator(&self) -> ItemMutator<'a, A> {
        ItemMutator::new(self.api, self.ctx.show_progress)
    }

    pub async fn update_lives(
        &self,
        playlist_id: &str,
        candidates: Vec<LiveCandidate>,
    ) -> Result<Plan> {
        let current = get_playlist_items(self.api, playlist_id, None).await?;
        let stats = get_stats_by_id(self.api, &video_ids(&current)).await?;

        let plan = plan_live(
            &current,
            &stats,
            candidates.into_iter().map(PlaylistItem::from).collect(),
        );

        self.apply(playlist_id, &plan, "livestream").await;
        Ok(plan)
    }

    /// Items whose delete succeeded are appended to `history`, with the stats
    /// and subscriber counts fetched before the deletes ran.
    pub async fn update_mixes(
        &self,
        playlist_id: &str,
        candidates: Vec<PlaylistItem>,
        history: &HistorySink,
    ) -> Result<Plan> {
        let current = get_playlist_items(self.api, playlist_id, None).await?;

        let held: HashSet<&str> = current.iter().map(|i| i.video_id.as_str()).collect();
        let mut unseen = Vec::new();
        for candidate in &candidates {
            if !held.contains(candidate.video_id.as_str()) && !unseen.contains(&candidate.video_id) {
                unseen.push(candidate.video_id.clone());
            }
        }
        let candidate_stats = get_stats_by_id(self.api, &unseen).await?;

        let plan = plan_mix(
            &current,
            candidates,
            &candidate_stats,
            &self.ctx.policy,
            self.ctx.reference_time,
        );

        let records = if plan.to_remove.is_empty() {
            Vec::new()
        } else {
            self.removal_records(&plan.to_remove).await?
        };

        let removed = self.apply(playlist_id, &plan, "video").await;

        let rows: Vec<HistoryRecord> = records
            .into_iter()
            .filter(|record| removed.contains(&record.item_id))
            .collect();
        if !rows.is_empty() {
            history.append(&rows)?;
            tracing::debug!("{} row(s) appended to {}", rows.len(), history.path().display());
        }
        Ok(plan)
    }

    async fn removal_records(&self, removed: &[PlaylistItem]) -> Result<Vec<HistoryRecord>> {
        let stats = get_stats_by_id(self.api, &video_ids(removed)).await?;
        let channel_ids: Vec<Option<String>> = removed.iter().map(|i| i.channel_id.clone()).collect();
        let subscribers = get_subscribers(self.api, &channel_ids).await?;

        Ok(removed
            .iter()
            .map(|item| {
                let subs = item
                    .channel_id
                    .as_ref()
                    .and_then(|id| subscribers.get(id).copied());
                HistoryRecord::new(item, stats.get(&item.video_id), subs)
            })
            .collect())
    }

    /// Inserts, then deletes. Returns the item IDs that were deleted.
    async fn apply(&self, playlist_id: &str, plan: &Plan, kind: &str) -> HashSet<String> {
        let mutator = self.mutator();
        let mut removed = HashSet::new();

        if !plan.to_add.is_empty() {
            let added = mutator.add(playlist_id, &plan.to_add).await;
            tracing::info!("{} new {}(s) added.", added, kind);
        }

        if !plan.to_remove.is_empty() {
            removed.extend(mutator.remove(playlist_id, &plan.to_remove).await);
            tracing::info!("{} {}(s) removed.", removed.len(), kind);
        }

        if plan.is_empty() {
            tracing::info!("No {} added or removed.", kind);
        }
        removed
    }

    /// Reorder the lives playlist by audience. Returns the number of items moved.
    pub async fn sort_livestreams(&self, playlist_id: &str) -> Result<usize> {
        let items = get_playlist_items(self.api, playlist_id, None).await?;
        if items.len() < 2 {
            return Ok(0);
        }

        let stats = get_stats_by_id(self.api, &video_ids(&items)).await?;
        let changes = plan_live_order(&items, &stats);
        if changes.is_empty() {
            return Ok(0);
        }

        let moved = self.mutator().reposition(playlist_id, &changes).await;
        tracing::info!("Livestreams playlist sorted.");
        Ok(moved)
    }
}
