//! Shared helpers for rsync-task integration tests

use rsync_task::{CommandRunner, Task};
use std::fs;
use std::path::Path;

/// Task running `sh -c script` through the stock runner
#[allow(dead_code)]
pub fn shell_task(script: &str) -> Task {
    Task::with_runner(CommandRunner::new("sh", ["-c", script]))
}

/// Write `files` (relative path, contents) under `root`
#[allow(dead_code)]
pub fn create_tree(root: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

/// Skip the current test when rsync is not installed
#[macro_export]
macro_rules! skip_if_no_rsync {
    () => {
        if rsync_task::CommandRunner::locate_rsync().is_none() {
            eprintln!("Skipping test: rsync binary not found in PATH");
            return;
        }
    };
}
