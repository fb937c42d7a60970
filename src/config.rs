//! Options for the rsync process
//!
//! Only the options the progress parser depends on are modelled here. Any
//! other rsync flag goes through [`RsyncOptions::extra_args`] verbatim.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

/// rsync invocation options
///
/// [`Task::new`](crate::Task::new) forces the four output-shaping flags on,
/// because the progress parser expects rsync's human-readable `--progress`
/// output. [`Task::without_forced_options`](crate::Task::without_forced_options)
/// uses the record as given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsyncOptions {
    /// Path to the rsync executable (default: `rsync` resolved through PATH)
    #[serde(default)]
    pub rsync_path: Option<PathBuf>,

    /// Output numbers in a human-readable format (`-h`)
    #[serde(default)]
    pub human_readable: bool,

    /// Keep partially transferred files (`--partial`)
    #[serde(default)]
    pub partial: bool,

    /// Show progress during transfer (`--progress`)
    #[serde(default)]
    pub progress: bool,

    /// Archive mode (`-a`)
    #[serde(default)]
    pub archive: bool,

    /// Additional arguments passed to rsync unchanged, before source and destination
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl RsyncOptions {
    /// Turn on every option the progress parser relies on
    pub fn apply_required(&mut self) {
        self.human_readable = true;
        self.partial = true;
        self.progress = true;
        self.archive = true;
    }

    /// Builder-style variant of [`apply_required`](Self::apply_required)
    #[must_use]
    pub fn with_required(mut self) -> Self {
        self.apply_required();
        self
    }

    /// Check the options for values rsync would misinterpret
    pub fn validate(&self) -> Result<()> {
        if let Some(index) = self.extra_args.iter().position(|arg| arg.trim().is_empty()) {
            return Err(Error::Config {
                message: format!("extra argument {index} is empty"),
                key: Some("extra_args".to_string()),
            });
        }
        if self
            .rsync_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(Error::Config {
                message: "rsync path is empty".to_string(),
                key: Some("rsync_path".to_string()),
            });
        }
        Ok(())
    }

    /// The program to launch
    pub fn program(&self) -> PathBuf {
        self.rsync_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("rsync"))
    }

    /// Render the flags, without source and destination
    pub fn to_args(&self) -> Vec<OsString> {
        let flags = [
            (self.human_readable, "-h"),
            (self.partial, "--partial"),
            (self.progress, "--progress"),
            (self.archive, "-a"),
        ];

        flags
            .into_iter()
            .filter_map(|(enabled, flag)| enabled.then(|| OsString::from(flag)))
            .chain(self.extra_args.iter().map(OsString::from))
            .collect()
    }
}
