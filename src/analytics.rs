//! Derives the workflow's cron schedule from how often mixes were released
//! on each weekday over the last few weeks.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use regex::{NoExpand, Regex};

use crate::error::{AppError, Result};
use crate::models::HistoryRecord;
use crate::store::HistorySink;

const LOOKBACK_WEEKS: i64 = 5;
const MAX_DAILY_UPDATES: u32 = 12;

/// Cron hour list for `n_update` runs a day, spread over the afternoon and
/// evening, always alongside the midnight run.
pub fn make_update_pattern(n_update: u32) -> String {
    if n_update == 0 {
        return "0 0 * *".to_string();
    }

    let n_update = n_update.min(MAX_DAILY_UPDATES) as usize;
    let step = (MAX_DAILY_UPDATES as usize) / n_update;
    let hours: Vec<usize> = (12..24).step_by(step).collect();
    let hours = &hours[hours.len().saturating_sub(n_update)..];

    let hours = hours
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("0 0,{hours} * *")
}

/// Mean uploads per weekday (index 0 = Sunday) across the ISO weeks seen in
/// the lookback period. A weekday with no upload in a seen week counts as 0.
pub fn weekday_averages(records: &[HistoryRecord], now: DateTime<Utc>) -> [u32; 7] {
    let since = now - TimeDelta::weeks(LOOKBACK_WEEKS);

    let mut counts: HashMap<(usize, (i32, u32)), u32> = HashMap::new();
    let mut weeks: HashSet<(i32, u32)> = HashSet::new();

    for date in records.iter().filter_map(|r| r.release_date).filter(|d| *d > since) {
        let iso = date.iso_week();
        let week = (iso.year(), iso.week());
        let weekday = date.weekday().num_days_from_sunday() as usize;
        weeks.insert(week);
        *counts.entry((weekday, week)).or_default() += 1;
    }

    let mut averages = [0u32; 7];
    if weeks.is_empty() {
        return averages;
    }

    for (weekday, average) in averages.iter_mut().enumerate() {
        let total: u32 = weeks
            .iter()
            .map(|week| counts.get(&(weekday, *week)).copied().unwrap_or(0))
            .sum();
        *average = (f64::from(total) / weeks.len() as f64).round_ties_even() as u32;
    }
    averages
}

pub fn schedule_lines(averages: &[u32; 7]) -> Vec<String> {
    averages
        .iter()
        .enumerate()
        .map(|(day, n)| format!("        -   cron: \"{} {}\"", make_update_pattern(*n), day))
        .collect()
}

/// Replace the `schedule:` block that precedes `jobs:` in a workflow file.
pub fn rewrite_workflow_schedule(workflow: &str, lines: &[String]) -> Result<String> {
    let re = Regex::new(r"(?s) {4}schedule:.*?jobs:")
        .map_err(|e| AppError::Other(e.into()))?;

    if !re.is_match(workflow) {
        return Err(AppError::Config(
            "workflow file has no schedule block before jobs".to_string(),
        ));
    }

    let replacement = format!("    schedule:\n{}\n\njobs:", lines.join("\n"));
    Ok(re.replace(workflow, NoExpand(&replacement)).into_owned())
}

pub fn update_workflow_schedule(
    history: &HistorySink,
    workflow_path: &Path,
    now: DateTime<Utc>,
) -> Result<[u32; 7]> {
    let records = history.read_all()?;
    let averages = weekday_averages(&records, now);

    let workflow = std::fs::read_to_string(workflow_path)?;
    let updated = rewrite_workflow_schedule(&workflow, &schedule_lines(&averages))?;
    std::fs::write(workflow_path, updated)?;

    tracing::info!("Workflow schedule updated: {:?} (Sunday first)", averages);
    Ok(averages)
}
