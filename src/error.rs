//! Error types for rsync-task
//!
//! Only process-level failures cross the [`Task::run`](crate::Task::run)
//! boundary. Irregular progress text is absorbed by the parser and never
//! turns into an [`Error`].

use thiserror::Error;

/// Result type alias for rsync-task operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rsync-task
#[derive(Debug, Error)]
pub enum Error {
    /// A regular expression failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An output pipe could not be handed out (already taken, or the process
    /// has already been started)
    #[error("pipe unavailable: {0}")]
    PipeUnavailable(String),

    /// The external tool could not be launched or waited on
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// The external tool exited unsuccessfully
    #[error("{}", exit_status_message(.code, .description))]
    ExitStatus {
        /// Exit code, `None` when the process was terminated by a signal
        code: Option<i32>,
        /// Human-readable meaning of the exit code
        description: &'static str,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error with context about which option is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The option that caused the error (e.g., "extra_args")
        key: Option<String>,
    },
}

impl Error {
    /// Build an [`Error::ExitStatus`] from a raw exit code
    pub fn exit_status(code: Option<i32>) -> Self {
        Error::ExitStatus {
            code,
            description: code.map_or("terminated by signal", exit_code_description),
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Pattern(_) => "invalid_pattern",
            Error::PipeUnavailable(_) => "pipe_unavailable",
            Error::ExternalTool(_) => "external_tool_error",
            Error::ExitStatus { .. } => "exit_status",
            Error::Io(_) => "io_error",
            Error::Config { .. } => "config_error",
        }
    }

    /// Whether rsync reported a partial transfer (exit codes 23 and 24)
    ///
    /// Some files were transferred; the log holds the per-file reasons.
    pub fn is_partial_transfer(&self) -> bool {
        matches!(self, Error::ExitStatus { code: Some(23 | 24), .. })
    }
}

fn exit_status_message(code: &Option<i32>, description: &str) -> String {
    match code {
        Some(code) => format!("exit status {code}: {description}"),
        None => format!("process {description}"),
    }
}

/// Meaning of an rsync exit code, as documented in rsync(1)
pub fn exit_code_description(code: i32) -> &'static str {
    match code {
        0 => "success",
        1 => "syntax or usage error",
        2 => "protocol incompatibility",
        3 => "errors selecting input/output files, dirs",
        4 => "requested action not supported",
        5 => "error starting client-server protocol",
        6 => "daemon unable to append to log-file",
        10 => "error in socket I/O",
        11 => "error in file I/O",
        12 => "error in rsync protocol data stream",
        13 => "errors with program diagnostics",
        14 => "error in IPC code",
        20 => "received SIGUSR1 or SIGINT",
        21 => "some error returned by waitpid()",
        22 => "error allocating core memory buffers",
        23 => "partial transfer due to error",
        24 => "partial transfer due to vanished source files",
        25 => "the --max-delete limit stopped deletions",
        30 => "timeout in data send/receive",
        35 => "timeout waiting for daemon connection",
        _ => "unknown error",
    }
}
