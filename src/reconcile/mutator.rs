use crate::models::PlaylistItem;
use crate::progress::Progress;
use crate::youtube::PlaylistApi;

use super::plan::PositionChange;

/// Applies playlist edits one call at a time. A rejected call is logged and
/// skipped. `add` and `reposition` return how many calls succeeded, `remove`
/// returns the item IDs actually deleted.
pub struct ItemMutator<'a, A: PlaylistApi + ?Sized> {
    api: &'a A,
    show_progress: bool,
}

impl<'a, A: PlaylistApi + ?Sized> ItemMutator<'a, A> {
    pub fn new(api: &'a A, show_progress: bool) -> Self {
        Self { api, show_progress }
    }

    pub async fn add(&self, playlist_id: &str, items: &[PlaylistItem]) -> usize {
        let mut progress = Progress::new(
            format!("Adding videos to the playlist ({playlist_id})"),
            items.len(),
            self.show_progress,
        );
        let mut done = 0;

        for item in items {
            match self.api.insert_playlist_item(playlist_id, &item.video_id).await {
                Ok(()) => done += 1,
                Err(e) => tracing::warn!("({}) - {}", item.video_id, e),
            }
            progress.tick();
        }
        done
    }

    pub async fn remove(&self, playlist_id: &str, items: &[PlaylistItem]) -> Vec<String> {
        let mut progress = Progress::new(
            format!("Deleting videos from the playlist ({playlist_id})"),
            items.len(),
            self.show_progress,
        );
        let mut done = Vec::new();

        for item in items {
            match self.api.delete_playlist_item(&item.item_id).await {
                Ok(()) => done.push(item.item_id.clone()),
                Err(e) => tracing::warn!("({}) - {}", item.video_id, e),
            }
            progress.tick();
        }
        done
    }

    pub async fn reposition(&self, playlist_id: &str, changes: &[PositionChange]) -> usize {
        let mut progress = Progress::new(
            format!("Moving livestreams in the playlist ({playlist_id})"),
            changes.len(),
            self.show_progress,
        );
        let mut done = 0;

        for change in changes {
            match self
                .api
                .update_playlist_item_position(
                    playlist_id,
                    &change.item_id,
                    &change.video_id,
                    change.to,
                )
                .await
            {
                Ok(()) => done += 1,
                Err(e) => tracing::warn!("({}) - {}", change.video_id, e),
            }
            progress.tick();
        }
        done
    }
}
