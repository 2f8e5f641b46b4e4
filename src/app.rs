use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::{collect_uploads, get_channels, LiveProbe};
use crate::models::{
    load_channels, load_ignore_list, load_playlists, save_channels, ChannelRecord, IgnoreList,
    LiveCandidate, PlaylistRegistry,
};
use crate::progress::Progress;
use crate::reconcile::{MixPolicy, Reconciler, RunContext};
use crate::store::{last_execution, HistorySink};
use crate::youtube::{encode_credentials_file, Credentials, PlaylistApi};

const CREDENTIALS_ENV_VAR: &str = "CREDS_B64";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Credentials on disk, progress shown.
    Local,
    /// Credentials from the CI secret, no progress output.
    Workflow,
}

impl ExecMode {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("local") => Self::Local,
            Some(_) => Self::Workflow,
        }
    }

    pub fn show_progress(self) -> bool {
        self == Self::Local
    }
}

/// Load credentials for `mode`, refreshing them once if they are stale.
pub async fn authenticate(config: &Config, mode: ExecMode) -> Result<Credentials> {
    let result = match mode {
        ExecMode::Local => {
            let path = config.credentials_path();
            let mut credentials = Credentials::from_file(&path)?;
            if credentials.ensure_valid(&config.token_uri).await? {
                credentials.save(&path)?;
                tracing::info!("API credentials refreshed.");
            }
            Ok(credentials)
        }
        ExecMode::Workflow => {
            let encoded = std::env::var(CREDENTIALS_ENV_VAR)
                .map_err(|_| AppError::Auth(format!("{CREDENTIALS_ENV_VAR} is not set")))?;
            let mut credentials = Credentials::from_base64(&encoded)?;
            if credentials.ensure_valid(&config.token_uri).await? {
                let path = config.refreshed_credentials_path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, credentials.to_base64()?)?;
                tracing::info!("API credentials refreshed.");
            }
            Ok(credentials)
        }
    };

    if let Err(e) = &result {
        tracing::error!("Unable to obtain API credentials: {}", e);
    }
    result
}

/// Keep the base64 copy of the local credentials current for the CI secret.
pub fn export_credentials(config: &Config, mode: ExecMode) -> Result<()> {
    if mode == ExecMode::Local {
        encode_credentials_file(&config.credentials_path(), &config.encoded_credentials_path())?;
    }
    Ok(())
}

pub struct App {
    config: Config,
    show_progress: bool,
    api: Box<dyn PlaylistApi>,
    probe: Box<dyn LiveProbe>,
    channels: Vec<ChannelRecord>,
    playlists: PlaylistRegistry,
    ignore: IgnoreList,
    history: HistorySink,
}

impl App {
    pub fn new(
        config: &Config,
        show_progress: bool,
        api: Box<dyn PlaylistApi>,
        probe: Box<dyn LiveProbe>,
    ) -> Result<Self> {
        let channels = load_channels(&config.channels_path())?;
        let playlists = load_playlists(&config.playlists_path())?;
        let ignore = load_ignore_list(&config.ignore_path())?;

        Ok(Self {
            config: config.clone(),
            show_progress,
            api,
            probe,
            channels,
            playlists,
            ignore,
            history: HistorySink::new(config.mix_history_path()),
        })
    }

    pub fn run_context(&self, reference_time: DateTime<Utc>) -> Result<RunContext> {
        let last_execution =
            last_execution(&self.config.last_exe_log_path())?.map(|d| d.with_timezone(&Utc));

        Ok(RunContext {
            reference_time,
            last_execution,
            policy: MixPolicy {
                min_duration_seconds: self.config.min_duration_seconds,
                retention_days: self.config.retention_days,
            },
            show_progress: self.show_progress,
        })
    }

    /// One full pass: lives playlist (update then sort), then mixes playlist.
    pub async fn run_once(&self, ctx: &RunContext) -> Result<()> {
        let reconciler = Reconciler::new(self.api.as_ref(), ctx);

        match self.refresh_lives(&reconciler).await {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                tracing::warn!("TIMEOUT ERROR: Livestreams playlist update cancelled.");
            }
            Err(e) => return Err(e),
        }

        let uploads = collect_uploads(
            self.api.as_ref(),
            &self.channels,
            &self.ignore,
            &ctx.fetch_window(),
            self.show_progress,
        )
        .await?;

        reconciler
            .update_mixes(&self.playlists.mixes.id, uploads, &self.history)
            .await?;

        Ok(())
    }

    async fn refresh_lives(&self, reconciler: &Reconciler<'_, dyn PlaylistApi>) -> Result<()> {
        let candidates = self.find_livestreams().await;
        let lives = &self.playlists.lives.id;
        reconciler.update_lives(lives, candidates).await?;
        reconciler.sort_livestreams(lives).await?;
        Ok(())
    }

    /// Probe every tracked channel, one page at a time.
    async fn find_livestreams(&self) -> Vec<LiveCandidate> {
        let mut progress = Progress::new(
            "Looking for livestreams",
            self.channels.len(),
            self.show_progress,
        );

        let found: Vec<Vec<LiveCandidate>> = stream::iter(&self.channels)
            .then(|channel| self.probe.find_livestreams(&channel.id))
            .inspect(|_| progress.tick())
            .collect()
            .await;

        found.into_iter().flatten().collect()
    }

    /// Refresh titles and uploads playlist IDs from the API, then sort the
    /// registry by title and write it back.
    pub async fn sort_registry(&mut self) -> Result<()> {
        let ids: Vec<String> = self.channels.iter().map(|c| c.id.clone()).collect();
        let fetched: HashMap<String, _> = get_channels(self.api.as_ref(), &ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        for channel in &mut self.channels {
            match fetched.get(&channel.id) {
                Some(info) => {
                    channel.title = info.title.clone();
                    if let Some(uploads) = &info.uploads_playlist_id {
                        channel.uploads_playlist_id = uploads.clone();
                    }
                }
                None => tracing::warn!("Channel not found: {}", channel.id),
            }
            if channel.uploads_playlist_id.is_empty() {
                channel.uploads_playlist_id = ChannelRecord::derived_uploads_id(&channel.id);
            }
        }

        self.channels.sort_by_key(|channel| channel.title.to_lowercase());
        save_channels(&self.config.channels_path(), &self.channels)?;

        tracing::info!("Channel registry sorted ({} channels).", self.channels.len());
        Ok(())
    }
}
