//! Period filter: selects entries by competence window, then by search term.

use core::fmt;

use crate::{Competence, Entry, ResultEngine};

/// Window of competences an analysis looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodFilter {
    /// A single bucket.
    Month(Competence),
    /// Inclusive `[start, end]`; empty when `start > end`.
    Range { start: Competence, end: Competence },
    /// Every entry, regardless of competence.
    All,
}

impl PeriodFilter {
    #[must_use]
    pub fn contains(&self, competence: Competence) -> bool {
        match *self {
            Self::Month(bucket) => competence == bucket,
            Self::Range { start, end } => start <= competence && competence <= end,
            Self::All => true,
        }
    }

    /// Moves the window's start by `offset` months.
    ///
    /// A single month moves as a whole; a range only moves its start, so the
    /// range may become empty. Fails when the moved bucket leaves the
    /// supported years.
    pub fn shift(self, offset: i32) -> ResultEngine<Self> {
        Ok(match self {
            Self::Month(bucket) => Self::Month(bucket.shift(offset)?),
            Self::Range { start, end } => Self::Range {
                start: start.shift(offset)?,
                end,
            },
            Self::All => Self::All,
        })
    }
}

impl fmt::Display for PeriodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(bucket) => write!(f, "{bucket}"),
            Self::Range { start, end } => write!(f, "{start} - {end}"),
            Self::All => f.write_str("all time"),
        }
    }
}

/// Entries of `entries` inside `period` whose name, location or description
/// contains `term` (case-insensitive). An absent or empty term matches all.
///
/// Input order is preserved.
pub fn filter_entries<'a>(
    entries: &'a [Entry],
    period: &PeriodFilter,
    term: Option<&str>,
) -> Vec<&'a Entry> {
    let needle = term.filter(|t| !t.is_empty()).map(str::to_lowercase);
    entries
        .iter()
        .filter(|entry| period.contains(entry.competence()))
        .filter(|entry| needle.as_deref().is_none_or(|n| entry.mentions(n)))
        .collect()
}
