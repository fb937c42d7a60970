//! Process supervision
//!
//! [`ProcessRunner`] is the seam between a [`Task`](crate::Task) and the
//! program it watches. [`CommandRunner`] is the stock implementation: it
//! launches a program through `tokio::process::Command` with its standard
//! output and standard error connected to OS pipes created up front, so the
//! readers exist before the process starts.

mod command;
mod traits;

pub use command::CommandRunner;
pub use traits::{OutputPipe, ProcessRunner};
