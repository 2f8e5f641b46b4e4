mod history;
mod playlist;
mod registry;

pub use history::HistoryRecord;
pub use playlist::{
    ChannelInfo, LiveCandidate, LiveStatus, PlaylistItem, PlaylistItemsPage, PrivacyStatus,
    VideoStats,
};
pub use registry::{
    load_channels, load_ignore_list, load_playlists, save_channels, ChannelRecord, IgnoreList,
    PlaylistRegistry,
};
