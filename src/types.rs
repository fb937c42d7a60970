//! Progress and log records exposed to callers

use serde::{Deserialize, Serialize};

const MAX_PERCENT: f64 = 100.0;
const MIN_DIVIDER: f64 = 1.0;

/// Latest progress parsed from rsync output
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    /// Files still to be checked
    pub remain: i64,
    /// Total files rsync knows about so far
    pub total: i64,
    /// Transfer speed as printed by rsync (e.g. `1.23MB/s`)
    pub speed: String,
    /// Percentage of checked files, `0.0..=100.0` for well-formed input
    pub progress: f64,
    /// Last line that looked like an object name
    #[serde(rename = "copied object")]
    pub copied_object: String,
}

impl TaskState {
    /// Set the to-check counts and recompute `progress` from them
    pub fn set_counts(&mut self, remain: i64, total: i64) {
        self.remain = remain;
        self.total = total;

        let copied = (total - remain) as f64;
        self.progress = copied / (total as f64).max(MIN_DIVIDER) * MAX_PERCENT;
    }
}

/// Raw output accumulated over the life of a task
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    /// Standard error, one `\n`-terminated entry per line
    pub stderr: String,
    /// Standard output, one `\n`-terminated entry per line
    pub stdout: String,
}

impl TaskLog {
    pub(crate) fn push_stdout(&mut self, line: &str) {
        self.stdout.push_str(line);
        self.stdout.push('\n');
    }

    pub(crate) fn push_stderr(&mut self, line: &str) {
        self.stderr.push_str(line);
        self.stderr.push('\n');
    }
}
