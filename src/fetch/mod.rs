mod items;
mod live;
mod stats;

pub use items::{collect_uploads, get_playlist_items, TimeWindow};
pub use live::{ChannelPageProbe, LiveProbe};
pub use stats::{get_channels, get_stats_by_id, get_subscribers};
