use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::error::Result;
use crate::models::{ChannelRecord, IgnoreList, PlaylistItem};
use crate::progress::Progress;
use crate::youtube::PlaylistApi;

/// Open interval of release dates, both ends rounded down to the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(after: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self {
            after: floor_hour(after),
            before: floor_hour(before),
        }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.after < date && date < self.before
    }
}

fn floor_hour(date: DateTime<Utc>) -> DateTime<Utc> {
    date.duration_trunc(TimeDelta::hours(1)).unwrap_or(date)
}

/// List a playlist, following `nextPageToken`.
///
/// With a window, only dated items inside it are kept, and paging stops at the
/// first page holding nothing newer than the window's lower bound. Uploads
/// playlists list newest first, so every later page would be older still.
pub async fn get_playlist_items<A: PlaylistApi + ?Sized>(
    api: &A,
    playlist_id: &str,
    window: Option<&TimeWindow>,
) -> Result<Vec<PlaylistItem>> {
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = api
            .list_playlist_items(playlist_id, page_token.as_deref())
            .await?;

        match window {
            Some(window) => {
                let reached_older = !page
                    .items
                    .iter()
                    .any(|item| item.release_date.is_some_and(|d| d > window.after));

                items.extend(
                    page.items
                        .into_iter()
                        .filter(|item| item.release_date.is_some_and(|d| window.contains(d))),
                );

                if reached_older {
                    break;
                }
            }
            None => items.extend(page.items),
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(items)
}

/// Gather candidate uploads for every tracked channel.
///
/// A channel whose uploads playlist 404s is skipped; the warning is suppressed
/// for channels on the ignore-list. Any other API error aborts the run.
pub async fn collect_uploads<A: PlaylistApi + ?Sized>(
    api: &A,
    channels: &[ChannelRecord],
    ignore: &IgnoreList,
    window: &TimeWindow,
    show_progress: bool,
) -> Result<Vec<PlaylistItem>> {
    let tracked: Vec<&ChannelRecord> = channels
        .iter()
        .filter(|channel| !ignore.skips_channel(&channel.id))
        .collect();

    let mut progress = Progress::new("Looking for videos to add", tracked.len(), show_progress);
    let mut uploads = Vec::new();

    for channel in tracked {
        match get_playlist_items(api, &channel.uploads_playlist_id, Some(window)).await {
            Ok(items) => {
                tracing::debug!("{} recent upload(s) from {}", items.len(), channel.title);
                uploads.extend(items);
            }
            Err(e) if e.is_playlist_not_found() => {
                if !ignore.expects_missing(&channel.id) {
                    tracing::warn!("Playlist not found: {}", channel.uploads_playlist_id);
                }
            }
            Err(e) => {
                tracing::error!("[{}] Unknown error: {}", channel.uploads_playlist_id, e);
                return Err(e);
            }
        }
        progress.tick();
    }

    Ok(uploads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrivacyStatus;
    use crate::youtube::fake::FakeApi;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn upload(video_id: &str, release_date: Option<DateTime<Utc>>) -> PlaylistItem {
        PlaylistItem {
            video_id: video_id.to_string(),
            item_id: format!("item-{video_id}"),
            release_date,
            status: PrivacyStatus::Public,
            channel_id: Some("UCa".to_string()),
            channel_name: Some("Channel A".to_string()),
        }
    }

    fn channel(id: &str) -> ChannelRecord {
        ChannelRecord {
            id: id.to_string(),
            uploads_playlist_id: ChannelRecord::derived_uploads_id(id),
            title: id.to_string(),
        }
    }

    #[test]
    fn window_rounds_down_and_excludes_bounds() {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 42, 7).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 10, 59, 59).unwrap(),
        );
        assert_eq!(window.after, at(1, 10));
        assert_eq!(window.before, at(2, 10));
        assert!(!window.contains(at(1, 10)));
        assert!(window.contains(at(1, 11)));
        assert!(!window.contains(at(2, 10)));
    }

    #[tokio::test]
    async fn unwindowed_fetch_reads_every_page() {
        let items: Vec<_> = (0..7).map(|i| upload(&format!("v{i}"), None)).collect();
        let api = FakeApi::with_page_size(3).with_playlist("PL", items);

        let fetched = get_playlist_items(&api, "PL", None).await.unwrap();

        assert_eq!(fetched.len(), 7);
        assert_eq!(api.state.lock().unwrap().page_requests.len(), 3);
    }

    #[tokio::test]
    async fn windowed_fetch_stops_at_first_page_entirely_older() {
        // Newest first: two pages inside the window, then older uploads.
        let items = vec![
            upload("new-1", Some(at(5, 12))),
            upload("new-2", Some(at(5, 8))),
            upload("premiere", None),
            upload("new-3", Some(at(4, 20))),
            upload("old-1", Some(at(2, 9))),
            upload("old-2", Some(at(1, 9))),
            upload("old-3", Some(at(1, 8))),
        ];
        let api = FakeApi::with_page_size(2).with_playlist("UUa", items);
        let window = TimeWindow::new(at(3, 0), at(6, 0));

        let fetched = get_playlist_items(&api, "UUa", Some(&window)).await.unwrap();

        let ids: Vec<_> = fetched.iter().map(|i| i.video_id.as_str()).collect();
        assert_eq!(ids, vec!["new-1", "new-2", "new-3"]);
        // Third page (old-1, old-2) is entirely older, so the fourth is never requested.
        assert_eq!(api.state.lock().unwrap().page_requests.len(), 3);
    }

    #[tokio::test]
    async fn missing_uploads_playlist_is_skipped() {
        let api = FakeApi::new().with_playlist("UUok", vec![upload("v1", Some(at(5, 12)))]);
        api.state
            .lock()
            .unwrap()
            .missing_playlists
            .extend(["UUgone".to_string(), "UUquiet".to_string()]);

        let mut ignore = IgnoreList::default();
        ignore.playlist_not_found_pass.insert("UCquiet".to_string());
        ignore.to_pass.insert("UCskipped".to_string());

        let channels = vec![channel("UCok"), channel("UCgone"), channel("UCquiet"), channel("UCskipped")];
        let window = TimeWindow::new(at(3, 0), at(6, 0));

        let uploads = collect_uploads(&api, &channels, &ignore, &window, false)
            .await
            .unwrap();

        assert_eq!(uploads.len(), 1);
        let requested: Vec<_> = api
            .state
            .lock()
            .unwrap()
            .page_requests
            .iter()
            .map(|(id, _)| id.clone())
            .collect();
        assert!(!requested.contains(&"UUskipped".to_string()));
    }

    #[tokio::test]
    async fn unknown_api_error_aborts_collection() {
        let api = FakeApi::new();
        api.state
            .lock()
            .unwrap()
            .broken_playlists
            .insert("UUbroken".to_string());

        let window = TimeWindow::new(at(3, 0), at(6, 0));
        let result = collect_uploads(
            &api,
            &[channel("UCbroken")],
            &IgnoreList::default(),
            &window,
            false,
        )
        .await;

        assert!(result.is_err());
    }
}
