//! Date-homogeneous chunking of record buffers.
//!
//! A chunk is the maximal run of consecutive accepted lines that share one
//! leading trading date. Scanning stops at the first accepted line with a
//! different date; that line is not consumed and begins the next chunk.

use crate::domain::TradeDate;

/// One archive entry's worth of transformed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Transformed bytes to store as the entry body.
    pub bytes: Vec<u8>,
    /// Trading date shared by every record in the chunk.
    pub date: TradeDate,
    /// Bytes of the input buffer covered by this chunk; resume from here.
    pub consumed: usize,
}

/// Raw lines of one date run, borrowed from the input buffer.
#[derive(Debug)]
pub(crate) struct DateRun<'a> {
    pub date: TradeDate,
    pub lines: Vec<&'a [u8]>,
    pub consumed: usize,
}

impl DateRun<'_> {
    /// Concatenate the run's lines, terminating an unterminated final line.
    pub fn passthrough_bytes(&self) -> Vec<u8> {
        let len: usize = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = Vec::with_capacity(len);
        for line in &self.lines {
            out.extend_from_slice(line);
            if !line.ends_with(b"\n") {
                out.push(b'\n');
            }
        }
        out
    }
}

/// Trading date in the first comma-separated field of a line, if any.
pub(crate) fn leading_date(line: &[u8]) -> Option<TradeDate> {
    let end = line
        .iter()
        .position(|&b| b == b',' || b == b'\n' || b == b'\r')
        .unwrap_or(line.len());
    std::str::from_utf8(&line[..end]).ok().and_then(TradeDate::parse)
}

/// Scan the next date run from the start of `buf`.
///
/// Lines whose leading field is not a valid date are skipped, as are lines
/// rejected by `keep`. Returns `None` once no accepted line remains.
pub(crate) fn next_date_run<'a>(
    buf: &'a [u8],
    mut keep: impl FnMut(TradeDate) -> bool,
) -> Option<DateRun<'a>> {
    let mut current: Option<TradeDate> = None;
    let mut lines = Vec::new();
    let mut pos = 0;

    for line in buf.split_inclusive(|&b| b == b'\n') {
        let start = pos;
        pos += line.len();

        let Some(date) = leading_date(line) else {
            continue;
        };
        if !keep(date) {
            continue;
        }

        match current {
            None => current = Some(date),
            Some(run_date) if run_date != date => {
                return Some(DateRun {
                    date: run_date,
                    lines,
                    consumed: start,
                });
            }
            Some(_) => {}
        }
        lines.push(line);
    }

    current.map(|date| DateRun {
        date,
        lines,
        consumed: buf.len(),
    })
}
