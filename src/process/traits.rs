//! The contract between a task and the process it supervises

use async_trait::async_trait;
use std::io::Read;

/// Readable end of a subprocess output stream
pub type OutputPipe = Box<dyn Read + Send>;

/// Something that can start a command and hand out its output streams
///
/// A [`Task`](crate::Task) asks for both pipes before calling
/// [`run`](ProcessRunner::run). Each pipe can be obtained at most once, and only
/// before the process starts; the reader sees end-of-stream once the process
/// (and anything it spawned that inherited the stream) has exited.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use rsync_task::process::{OutputPipe, ProcessRunner};
/// use std::io::Cursor;
///
/// struct Canned;
///
/// #[async_trait]
/// impl ProcessRunner for Canned {
///     fn stdout_pipe(&mut self) -> rsync_task::Result<OutputPipe> {
///         Ok(Box::new(Cursor::new(b"file.txt\n".to_vec())))
///     }
///
///     fn stderr_pipe(&mut self) -> rsync_task::Result<OutputPipe> {
///         Ok(Box::new(std::io::empty()))
///     }
///
///     async fn run(&mut self) -> rsync_task::Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ProcessRunner: Send {
    /// Take the readable end of the process's standard output
    ///
    /// # Errors
    ///
    /// Returns [`Error::PipeUnavailable`](crate::Error::PipeUnavailable) if the
    /// pipe was already taken or the process already started, or an I/O error
    /// if the pipe could not be created.
    fn stdout_pipe(&mut self) -> crate::Result<OutputPipe>;

    /// Take the readable end of the process's standard error
    ///
    /// Same contract as [`stdout_pipe`](ProcessRunner::stdout_pipe).
    fn stderr_pipe(&mut self) -> crate::Result<OutputPipe>;

    /// Start the process and wait for it to exit
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be launched or exits
    /// unsuccessfully.
    async fn run(&mut self) -> crate::Result<()>;
}
