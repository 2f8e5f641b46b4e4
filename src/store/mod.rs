mod history;
mod run_log;

pub use history::HistorySink;
pub use run_log::{copy_last_execution, last_execution, LOG_TIME_FORMAT, RUN_ENDED, RUN_STARTED};
