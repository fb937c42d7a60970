//! Line consumers for the two output streams

use super::Shared;
use crate::progress::ProgressParser;
use std::io::{BufRead, BufReader, Read, Write};
use tracing::debug;

/// Call `on_line` for every line of `reader` until end-of-stream or a read error
///
/// Lines are split on `\n`; a trailing `\r` is dropped and a final line
/// without terminator is still delivered.
fn for_each_line(reader: impl Read, stream: &'static str, mut on_line: impl FnMut(&[u8])) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => on_line(trim_line_ending(&buf)),
            Err(e) => {
                debug!(stream, error = %e, "Stopped reading output");
                return;
            }
        }
    }

    debug!(stream, "Output stream closed");
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Forward, parse and log every stdout line
pub(super) fn consume_stdout(
    reader: impl Read,
    sink: &mut dyn Write,
    parser: &ProgressParser,
    shared: &Shared,
) {
    for_each_line(reader, "stdout", |raw| {
        let _ = sink.write_all(raw);

        let line = String::from_utf8_lossy(raw);
        shared.update_state(|state| parser.parse_line(&line, state));
        shared.update_log(|log| log.push_stdout(&line));
    });
}

/// Log and forward every stderr line
pub(super) fn consume_stderr(reader: impl Read, sink: &mut dyn Write, shared: &Shared) {
    for_each_line(reader, "stderr", |raw| {
        shared.update_log(|log| log.push_stderr(&String::from_utf8_lossy(raw)));

        let _ = sink.write_all(raw);
    });
}
