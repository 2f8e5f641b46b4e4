use std::path::Path;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::error::Result;

pub const RUN_STARTED: &str = "Process started.";
pub const RUN_ENDED: &str = "Process ended.";

/// Timestamp format shared by every history log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Read the start time of the previous run from the first line of the last-exe log.
pub fn last_execution(path: &Path) -> Result<Option<DateTime<FixedOffset>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };

    Ok(parse_log_timestamp(first_line))
}

fn parse_log_timestamp(line: &str) -> Option<DateTime<FixedOffset>> {
    let re = Regex::new(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}[+-]\d{2}:?\d{2}").ok()?;
    let stamp = re.find(line)?.as_str().replace(':', "");
    // Colons were stripped from the offset and the time alike.
    DateTime::parse_from_str(&stamp, "%Y-%m-%d %H%M%S%z").ok()
}

/// Copy everything from the last run-start marker of the history log into
/// the last-exe log.
pub fn copy_last_execution(history_log: &Path, last_exe_log: &Path) -> Result<()> {
    let history = std::fs::read_to_string(history_log)?;

    let Some(marker) = history.rfind(RUN_STARTED) else {
        tracing::debug!("No run marker in {}", history_log.display());
        return Ok(());
    };
    let line_start = history[..marker].rfind('\n').map_or(0, |idx| idx + 1);

    std::fs::write(last_exe_log, &history[line_start..])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn last_execution_reads_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_exe.log");
        std::fs::write(
            &path,
            "2024-03-05 18:02:11+0100 [INFO] - Process started.\n\
             2024-03-05 18:04:40+0100 [INFO] - Process ended.\n",
        )
        .unwrap();

        let expected = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 18, 2, 11)
            .unwrap();
        assert_eq!(last_execution(&path).unwrap(), Some(expected));
    }

    #[test]
    fn colon_offsets_are_accepted() {
        let parsed = parse_log_timestamp("2024-03-05 18:02:11-05:00 [INFO] - Process started.");
        assert_eq!(parsed.map(|d| d.offset().local_minus_utc()), Some(-5 * 3600));
    }

    #[test]
    fn absent_or_unparsable_log_means_no_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_exe.log");
        assert_eq!(last_execution(&path).unwrap(), None);

        std::fs::write(&path, "garbage\n").unwrap();
        assert_eq!(last_execution(&path).unwrap(), None);
    }

    #[test]
    fn copies_from_last_run_marker() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join("history.log");
        let last_exe = dir.path().join("last_exe.log");
        std::fs::write(
            &history,
            "2024-03-04 18:00:00+0100 [INFO] - Process started.\n\
             2024-03-04 18:01:00+0100 [INFO] - Process ended.\n\
             2024-03-05 18:00:00+0100 [INFO] - Process started.\n\
             2024-03-05 18:00:30+0100 [WARN] - Playlist not found: UUx\n\
             2024-03-05 18:01:00+0100 [INFO] - Process ended.\n",
        )
        .unwrap();

        copy_last_execution(&history, &last_exe).unwrap();

        let copied = std::fs::read_to_string(&last_exe).unwrap();
        assert!(copied.starts_with("2024-03-05 18:00:00+0100 [INFO] - Process started."));
        assert_eq!(copied.lines().count(), 3);
    }
}
