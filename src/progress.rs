//! Parser for rsync `--progress` output
//!
//! rsync prints lines like
//!
//! ```text
//! dir/file.bin
//!         999,999 99%  999.99kB/s    0:00:59 (xfr#9, to-chk=999/9999)
//! ```
//!
//! Each line is checked independently for the to-check counts, a transfer
//! speed and an object name. Malformed numbers fall back to zero or an empty
//! string; nothing here returns an error once the parser exists.

use crate::error::Result;
use crate::matcher::Matcher;
use crate::types::TaskState;
use std::sync::LazyLock;

// Digit and whitespace classes are ASCII-only: `\d` and `\s` in `regex` would
// also accept other scripts' digits and Unicode spaces.
const PROGRESS_PATTERN: &str = r"\(.+-chk=([0-9]+.[0-9]+)";
const SPEED_PATTERN: &str = r"([0-9]+\.[0-9]+.{2}/s)";
const OBJECT_PATTERN: &str = r"^([^\t\n\f\r ]+.*[^\t\n\f\r ]+)$";

const SPEED_RECORDS: usize = 2;
const SPEED_RECORD_INDEX: usize = 1;
const SPEED_FIELD_INDEX: usize = 1;

// The patterns are constants; failing to compile them is a programming error.
#[allow(clippy::expect_used)]
static RSYNC_PARSER: LazyLock<ProgressParser> =
    LazyLock::new(|| ProgressParser::new().expect("built-in rsync progress patterns compile"));

/// The three rsync output extractors
#[derive(Debug, Clone)]
pub struct ProgressParser {
    progress: Matcher,
    speed: Matcher,
    object: Matcher,
}

impl ProgressParser {
    /// Compile the built-in patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            progress: Matcher::new(PROGRESS_PATTERN)?,
            speed: Matcher::new(SPEED_PATTERN)?,
            object: Matcher::new(OBJECT_PATTERN)?,
        })
    }

    /// Process-wide parser, compiled on first use
    pub fn rsync() -> &'static Self {
        &RSYNC_PARSER
    }

    /// Apply everything found on `line` to `state`
    pub fn parse_line(&self, line: &str, state: &mut TaskState) {
        if self.progress.is_match(line) {
            let (remain, total) = parse_remain_total(&self.progress.extract(line));
            state.set_counts(remain, total);
        }

        if self.speed.is_match(line) {
            state.speed = select_speed(&self.speed.extract_all_submatches(line, SPEED_RECORDS));
        }

        if let Some(object) = self.object.find(line) {
            state.copied_object = object.to_string();
        }
    }
}

/// Split a `REMAIN/TOTAL` fragment, defaulting unparsable halves to zero
pub fn parse_remain_total(fragment: &str) -> (i64, i64) {
    let mut parts = fragment.split('/');
    match (parts.next(), parts.next()) {
        (Some(remain), Some(total)) => (
            remain.parse().unwrap_or_default(),
            total.parse().unwrap_or_default(),
        ),
        _ => (0, 0),
    }
}

/// Pick the speed out of the submatch records
///
/// rsync's progress line carries one speed; the value is read from the second
/// record, so lines with a single occurrence yield an empty string.
pub fn select_speed(records: &[Vec<String>]) -> String {
    records
        .get(SPEED_RECORD_INDEX)
        .and_then(|record| record.get(SPEED_FIELD_INDEX))
        .cloned()
        .unwrap_or_default()
}
