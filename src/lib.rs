//! # rsync-task
//!
//! Run `rsync` as a subprocess and follow its progress.
//!
//! A [`Task`] launches rsync with `--progress`-style output, reads its
//! standard output and standard error concurrently, and turns progress lines
//! into a [`TaskState`] (files remaining and total, percentage, speed, the
//! object currently being copied). Raw output is kept in a [`TaskLog`] and can
//! also be forwarded to caller-supplied writers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rsync_task::{RsyncOptions, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut task = Task::new("/srv/data/", "backup:/srv/data", RsyncOptions::default())?;
//!     task.set_stdout(std::io::stdout());
//!
//!     let result = task.run().await;
//!
//!     println!("{:?}", task.state());
//!     if let Err(e) = result {
//!         eprintln!("rsync failed: {e}\n{}", task.log().stderr);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Parsing is lenient: output that does not look like progress leaves the
//! state alone, and garbled numbers become zero. Only process-level failures
//! are returned as errors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// rsync options
pub mod config;
/// Error types
pub mod error;
/// Regex wrapper
pub mod matcher;
/// Process runner abstraction
pub mod process;
/// rsync output parsing
pub mod progress;
/// Task controller and output consumers
pub mod task;
/// Progress and log records
pub mod types;

pub use config::RsyncOptions;
pub use error::{Error, Result, exit_code_description};
pub use matcher::Matcher;
pub use process::{CommandRunner, OutputPipe, ProcessRunner};
pub use progress::ProgressParser;
pub use task::{Sink, Task, TaskHandle};
pub use types::{TaskLog, TaskState};
