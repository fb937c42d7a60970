//! Process runner backed by `tokio::process::Command`

use super::traits::{OutputPipe, ProcessRunner};
use crate::config::RsyncOptions;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::PipeWriter;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
enum PipeSlot {
    #[default]
    Unrequested,
    Pending(PipeWriter),
    Taken,
}

impl PipeSlot {
    fn take_reader(&mut self, stream: &str) -> Result<OutputPipe> {
        match self {
            PipeSlot::Unrequested => {
                let (reader, writer) = std::io::pipe()?;
                *self = PipeSlot::Pending(writer);
                Ok(Box::new(reader))
            }
            PipeSlot::Pending(_) | PipeSlot::Taken => {
                Err(Error::PipeUnavailable(format!("{stream} already taken")))
            }
        }
    }

    /// Write end for the child; streams nobody asked for go to null
    fn take_stdio(&mut self) -> Stdio {
        match std::mem::replace(self, PipeSlot::Taken) {
            PipeSlot::Pending(writer) => Stdio::from(writer),
            PipeSlot::Unrequested | PipeSlot::Taken => Stdio::null(),
        }
    }
}

/// Runs an external program with its output connected to OS pipes
///
/// # Examples
///
/// ```no_run
/// use rsync_task::RsyncOptions;
/// use rsync_task::process::CommandRunner;
///
/// let options = RsyncOptions::default().with_required();
/// let runner = CommandRunner::rsync("src/", "backup/", &options)?;
/// # Ok::<(), rsync_task::Error>(())
/// ```
#[derive(Debug)]
pub struct CommandRunner {
    program: PathBuf,
    args: Vec<OsString>,
    stdout: PipeSlot,
    stderr: PipeSlot,
    started: bool,
}

impl CommandRunner {
    /// Create a runner for `program` with `args`
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            stdout: PipeSlot::default(),
            stderr: PipeSlot::default(),
            started: false,
        }
    }

    /// Create a runner for `rsync [options] source destination`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options fail validation.
    pub fn rsync(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        options: &RsyncOptions,
    ) -> Result<Self> {
        options.validate()?;

        let mut args = options.to_args();
        args.push(source.as_ref().as_os_str().to_owned());
        args.push(destination.as_ref().as_os_str().to_owned());

        Ok(Self::new(options.program(), args))
    }

    /// Search PATH for the rsync binary
    pub fn locate_rsync() -> Option<PathBuf> {
        which::which("rsync").ok()
    }

    /// The program this runner launches
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments passed to the program
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn ensure_not_started(&self) -> Result<()> {
        if self.started {
            return Err(Error::PipeUnavailable("process already started".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for CommandRunner {
    fn stdout_pipe(&mut self) -> Result<OutputPipe> {
        self.ensure_not_started()?;
        self.stdout.take_reader("stdout")
    }

    fn stderr_pipe(&mut self) -> Result<OutputPipe> {
        self.ensure_not_started()?;
        self.stderr.take_reader("stderr")
    }

    async fn run(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::ExternalTool(format!(
                "{} was already started",
                self.program.display()
            )));
        }
        self.started = true;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(self.stdout.take_stdio())
            .stderr(self.stderr.take_stdio());

        debug!(program = %self.program.display(), args = ?self.args, "Starting process");
        let spawned = command.spawn();
        // The command holds the parent's copies of the write ends; readers only
        // see EOF once these are closed.
        drop(command);

        let mut child = spawned.map_err(|e| {
            Error::ExternalTool(format!("Failed to execute {}: {}", self.program.display(), e))
        })?;

        let status = child.wait().await.map_err(|e| {
            Error::ExternalTool(format!(
                "Failed to wait for {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if status.success() {
            info!(program = %self.program.display(), "Process exited successfully");
            Ok(())
        } else {
            warn!(program = %self.program.display(), code = ?status.code(), "Process exited with failure");
            Err(Error::exit_status(status.code()))
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn rsync_runner_renders_arguments() {
        let options = RsyncOptions {
            extra_args: vec!["--delete".into()],
            ..Default::default()
        }
        .with_required();

        let runner = CommandRunner::rsync("/data/src/", "host:/backup", &options).unwrap();

        assert_eq!(runner.program(), Path::new("rsync"));
        assert_eq!(
            runner.args(),
            [
                "-h",
                "--partial",
                "--progress",
                "-a",
                "--delete",
                "/data/src/",
                "host:/backup"
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn rsync_runner_rejects_invalid_options() {
        let options = RsyncOptions {
            extra_args: vec![String::new()],
            ..Default::default()
        };
        assert!(matches!(
            CommandRunner::rsync("a", "b", &options),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn pipe_can_be_taken_once() {
        let mut runner = CommandRunner::new("true", Vec::<OsString>::new());
        assert!(runner.stdout_pipe().is_ok());
        assert!(matches!(runner.stdout_pipe(), Err(Error::PipeUnavailable(_))));
        assert!(runner.stderr_pipe().is_ok());
        assert!(matches!(runner.stderr_pipe(), Err(Error::PipeUnavailable(_))));
    }

    #[test]
    fn locate_rsync_agrees_with_which() {
        assert_eq!(
            CommandRunner::locate_rsync().is_some(),
            which::which("rsync").is_ok()
        );
    }

    #[tokio::test]
    async fn missing_binary_is_external_tool_error() {
        let mut runner = CommandRunner::new("/nonexistent/path/to/rsync", ["-a"]);
        let mut stdout = runner.stdout_pipe().unwrap();

        match runner.run().await {
            Err(Error::ExternalTool(msg)) => assert!(msg.contains("Failed to execute")),
            other => panic!("expected ExternalTool error, got {other:?}"),
        }

        // write end was released, so the reader is at EOF rather than blocked
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn pipes_unavailable_after_start() {
        let mut runner = CommandRunner::new("/nonexistent/path/to/rsync", Vec::<OsString>::new());
        let _ = runner.run().await;
        assert!(matches!(runner.stdout_pipe(), Err(Error::PipeUnavailable(_))));
        assert!(matches!(runner.run().await, Err(Error::ExternalTool(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let mut runner = CommandRunner::new("sh", ["-c", "echo out; echo err >&2; exit 23"]);
        let mut stdout = runner.stdout_pipe().unwrap();
        let mut stderr = runner.stderr_pipe().unwrap();

        let result = runner.run().await;
        assert!(matches!(result, Err(Error::ExitStatus { code: Some(23), .. })));

        let mut out = String::new();
        stdout.read_to_string(&mut out).unwrap();
        let mut err = String::new();
        stderr.read_to_string(&mut err).unwrap();
        assert_eq!(out, "out\n");
        assert_eq!(err, "err\n");
    }
}
