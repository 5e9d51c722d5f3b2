//! Year/month buckets ("competence") entries are attributed to.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// A calendar month bucket, rendered as zero-padded `YYYY/MM`.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// rendered strings because years are limited to four digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competence {
    year: i32,
    month: u32,
}

impl Competence {
    pub const MIN_YEAR: i32 = 0;
    pub const MAX_YEAR: i32 = 9999;

    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(EngineError::InvalidCompetence(format!(
                "year {year} out of range"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidCompetence(format!(
                "month {month} out of range"
            )));
        }
        Ok(Self { year, month })
    }

    /// The bucket a calendar date belongs to.
    ///
    /// Years outside `MIN_YEAR..=MAX_YEAR` are kept as is; use
    /// [`Competence::checked_from_date`] where the bucket must render as
    /// `YYYY/MM`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn checked_from_date(date: NaiveDate) -> ResultEngine<Self> {
        Self::new(date.year(), date.month())
            .map_err(|_| EngineError::InvalidDate(format!("{date} is outside years 0000-9999")))
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Moves the bucket by `offset` months (negative goes back in time).
    ///
    /// Fails when the result leaves `MIN_YEAR..=MAX_YEAR`.
    pub fn shift(self, offset: i32) -> ResultEngine<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(offset);
        let out_of_range =
            || EngineError::InvalidCompetence(format!("{self} shifted by {offset} months"));
        let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range())?;
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month).map_err(|_| out_of_range())
    }

    /// Buckets from `back` months before to `forward` months after `self`,
    /// newest first. Buckets past the supported years are left out.
    #[must_use]
    pub fn window(self, back: u32, forward: u32) -> Vec<Self> {
        (-i64::from(back)..=i64::from(forward))
            .rev()
            .filter_map(|offset| i32::try_from(offset).ok())
            .filter_map(|offset| self.shift(offset).ok())
            .collect()
    }

    /// Whether `date` falls in this bucket.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

impl fmt::Display for Competence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

impl FromStr for Competence {
    type Err = EngineError;

    /// Parses a strict `YYYY/MM` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidCompetence(format!("expected YYYY/MM, got {s:?}"));

        let (year, month) = s.trim().split_once('/').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Competence {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Competence> for String {
    fn from(value: Competence) -> Self {
        value.to_string()
    }
}
