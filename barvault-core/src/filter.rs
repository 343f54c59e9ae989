//! Instrument-code filtering and file-name parsing.
//!
//! Source files carry the instrument code (and, for minute data, the year)
//! in their names:
//! - daily bars: `DAY600000.csv`
//! - minute bars: `MIN600000_2024.csv`

use thiserror::Error;

/// Predicate deciding whether an instrument code belongs to this run.
pub trait CodeFilter: Send + Sync {
    fn in_range(&self, code: &str) -> bool;
}

impl<F> CodeFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn in_range(&self, code: &str) -> bool {
        self(code)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("empty code range")]
    Empty,

    #[error("range bounds must have the same width: '{0}'")]
    WidthMismatch(String),

    #[error("range start is after range end: '{0}'")]
    Inverted(String),
}

/// Inclusive code ranges such as `600000-609999`.
///
/// Bounds compare lexicographically, so codes only match ranges of the same
/// width (`000200` never matches `1-500`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeRanges {
    ranges: Vec<(String, String)>,
}

impl CodeRanges {
    /// Parse `"lo-hi"` specs; a bare code is a one-element range.
    pub fn parse<I, S>(specs: I) -> Result<Self, RangeParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranges = Vec::new();
        for spec in specs {
            let spec = spec.as_ref().trim();
            let (lo, hi) = spec.split_once('-').unwrap_or((spec, spec));
            let (lo, hi) = (lo.trim(), hi.trim());
            if lo.is_empty() || hi.is_empty() {
                return Err(RangeParseError::Empty);
            }
            if lo.len() != hi.len() {
                return Err(RangeParseError::WidthMismatch(spec.to_string()));
            }
            if lo > hi {
                return Err(RangeParseError::Inverted(spec.to_string()));
            }
            ranges.push((lo.to_string(), hi.to_string()));
        }
        Ok(Self { ranges })
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl CodeFilter for CodeRanges {
    fn in_range(&self, code: &str) -> bool {
        self.ranges
            .iter()
            .any(|(lo, hi)| code.len() == lo.len() && lo.as_str() <= code && code <= hi.as_str())
    }
}

/// Base name of a path, accepting both separators.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Instrument code of a daily-bar file: text after the last `day` tag.
pub(crate) fn day_code(file_name: &str) -> Option<String> {
    let name = base_name(file_name).to_ascii_lowercase();
    let stem = stem(&name);
    let tag = stem.rfind("day")?;
    Some(stem[tag + 3..].to_string())
}

/// Instrument code and year of a minute file: `<...>min<code><sep><YYYY>`.
pub(crate) fn minute_code_and_year(file_name: &str) -> Option<(String, i32)> {
    let name = base_name(file_name).to_ascii_lowercase();
    if !name.is_ascii() {
        return None;
    }
    let stem = stem(&name);
    if stem.len() < 5 {
        return None;
    }

    let year_part = &stem[stem.len() - 4..];
    if !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = year_part.parse().ok()?;

    let code_end = stem.len() - 5;
    let tag = stem[..code_end].rfind("min")?;
    Some((stem[tag + 3..code_end].to_string(), year))
}
