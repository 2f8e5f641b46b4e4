use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::Result;
use crate::store::LOG_TIME_FORMAT;

/// `2024-03-05 18:02:11+0100 [INFO] - message`
struct HistoryLineFormat;

impl<S, N> FormatEvent<S, N> for HistoryLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format(LOG_TIME_FORMAT);
        write!(writer, "{} [{}] - ", now, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Route logs to the cumulative history file (info and up) and to stderr
/// (warnings and errors unless `RUST_LOG` says otherwise).
pub fn init(history_log: &Path) -> Result<()> {
    if let Some(parent) = history_log.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(history_log)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(HistoryLineFormat)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(EnvFilter::new("playlist_curator=info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        );

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
