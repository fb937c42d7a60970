//! rsync task controller
//!
//! A [`Task`] runs one rsync process to completion. While it runs, one
//! blocking consumer reads standard output (forwarding, parsing and logging
//! each line) and another reads standard error (logging and forwarding).
//! Progress and logs are shared through a [`TaskHandle`], so they can be
//! polled from anywhere while [`Task::run`] is in progress and remain
//! available after it returns.

mod stream;


use crate::config::RsyncOptions;
use crate::error::Result;
use crate::process::{CommandRunner, ProcessRunner};
use crate::progress::ProgressParser;
use crate::types::{TaskLog, TaskState};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::task::{JoinHandle, spawn_blocking};
use tracing::{debug, warn};

/// Destination for forwarded output bytes
pub type Sink = Box<dyn Write + Send>;

/// A caller's sink, held jointly by the task and the consumers of a run
///
/// The task keeps its reference for its whole lifetime, so the sink is not
/// lost when a `run` future is dropped before its consumers finish.
#[derive(Clone)]
struct SharedSink(Arc<Mutex<Sink>>);

impl SharedSink {
    fn new(sink: Sink) -> Self {
        Self(Arc::new(Mutex::new(sink)))
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// State and log shared between the consumers and any number of readers
///
/// Lock poisoning only means a consumer panicked mid-line; the plain-value
/// records are still usable, so readers and writers recover the guard.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: RwLock<TaskState>,
    log: Mutex<TaskLog>,
}

impl Shared {
    pub(crate) fn state(&self) -> TaskState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn log(&self) -> TaskLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn update_state(&self, f: impl FnOnce(&mut TaskState)) {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
    }

    pub(crate) fn update_log(&self, f: impl FnOnce(&mut TaskLog)) {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Read-only view of a task's progress and output
///
/// Cheap to clone, `Send` and `Sync`. Every read returns a snapshot; the
/// fields of one [`TaskState`] always come from the same parsed line.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    shared: Arc<Shared>,
}

impl TaskHandle {
    /// Snapshot of the current progress
    pub fn state(&self) -> TaskState {
        self.shared.state()
    }

    /// Snapshot of the output accumulated so far
    pub fn log(&self) -> TaskLog {
        self.shared.log()
    }
}

/// One rsync run with live progress
///
/// # Examples
///
/// ```no_run
/// use rsync_task::{RsyncOptions, Task};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut task = Task::new("photos/", "/mnt/backup/photos", RsyncOptions::default())?;
/// let handle = task.handle();
///
/// let run = tokio::spawn(async move { task.run().await });
/// while !run.is_finished() {
///     let state = handle.state();
///     println!("{:.1}% {} {}", state.progress, state.speed, state.copied_object);
///     tokio::time::sleep(Duration::from_millis(500)).await;
/// }
/// run.await??;
/// # Ok(())
/// # }
/// ```
pub struct Task {
    runner: Box<dyn ProcessRunner>,
    shared: Arc<Shared>,
    parser: &'static ProgressParser,
    stdout: SharedSink,
    stderr: SharedSink,
}

impl Task {
    /// Create a task for `rsync source destination`
    ///
    /// Human-readable output, partial transfers, progress reporting and
    /// archive mode are switched on regardless of `options`, since progress
    /// parsing depends on that output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn new(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        mut options: RsyncOptions,
    ) -> Result<Self> {
        options.apply_required();
        Self::without_forced_options(source, destination, options)
    }

    /// Create a task using `options` exactly as given
    ///
    /// Without `--progress` and `-h` the state will mostly stay at its
    /// defaults; that is not reported as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the options are invalid.
    pub fn without_forced_options(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        options: RsyncOptions,
    ) -> Result<Self> {
        Ok(Self::with_runner(CommandRunner::rsync(
            source,
            destination,
            &options,
        )?))
    }

    /// Create a task around any [`ProcessRunner`]
    pub fn with_runner(runner: impl ProcessRunner + 'static) -> Self {
        Self {
            runner: Box::new(runner),
            shared: Arc::default(),
            parser: ProgressParser::rsync(),
            stdout: SharedSink::new(Box::new(io::sink())),
            stderr: SharedSink::new(Box::new(io::sink())),
        }
    }

    /// Forward every stdout line (without its terminator) to `stdout`
    pub fn set_stdout(&mut self, stdout: impl Write + Send + 'static) {
        self.stdout = SharedSink::new(Box::new(stdout));
    }

    /// Forward every stderr line (without its terminator) to `stderr`
    pub fn set_stderr(&mut self, stderr: impl Write + Send + 'static) {
        self.stderr = SharedSink::new(Box::new(stderr));
    }

    /// Snapshot of the current progress
    pub fn state(&self) -> TaskState {
        self.shared.state()
    }

    /// Snapshot of the output accumulated so far
    pub fn log(&self) -> TaskLog {
        self.shared.log()
    }

    /// A handle for reading progress while [`run`](Self::run) is in progress
    pub fn handle(&self) -> TaskHandle {
        TaskHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run the process to completion
    ///
    /// Returns once the process has exited and both output streams are
    /// drained. Meant to be called once per task.
    ///
    /// Dropping the returned future (for example under
    /// `tokio::time::timeout`) does not stop the process runner's child or
    /// the consumers; they keep feeding the shared state, log and sinks until
    /// the streams close. The sinks stay attached to the task either way.
    ///
    /// # Errors
    ///
    /// Returns the pipe error if an output stream cannot be acquired (the
    /// process is not started), otherwise the process's launch or exit error.
    pub async fn run(&mut self) -> Result<()> {
        let stderr = self.runner.stderr_pipe()?;
        let stdout = self.runner.stdout_pipe()?;

        debug!("Starting output consumers");

        let stdout_worker = {
            let shared = Arc::clone(&self.shared);
            let parser = self.parser;
            let mut sink = self.stdout.clone();
            spawn_blocking(move || stream::consume_stdout(stdout, &mut sink, parser, &shared))
        };

        let stderr_worker = {
            let shared = Arc::clone(&self.shared);
            let mut sink = self.stderr.clone();
            spawn_blocking(move || stream::consume_stderr(stderr, &mut sink, &shared))
        };

        let result = self.runner.run().await;

        join_consumer("stdout", stdout_worker).await;
        join_consumer("stderr", stderr_worker).await;

        result
    }
}

async fn join_consumer(stream: &'static str, worker: JoinHandle<()>) {
    if let Err(e) = worker.await {
        warn!(stream, error = %e, "Output consumer panicked");
    }
}
