//! The module contains the `Entry` type, the single record the tracker keeps.
//!
//! Both income and expenses are represented by `Entry`; [`EntryDraft`] is the
//! same record before the store has assigned it an id.
use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Competence, EngineError, MoneyCents, ResultEngine};

/// Identifier assigned by the record store on creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| EngineError::UnknownValue(format!("invalid entry id: {s}")))
    }
}

/// Household member owning an entry. Every query is partitioned by owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Owner {
    #[default]
    Bruno,
    Fernanda,
}

impl Owner {
    pub const ALL: [Owner; 2] = [Owner::Bruno, Owner::Fernanda];

    /// Canonical label, as stored in the `pessoa` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bruno => "BRUNO",
            Self::Fernanda => "FERNANDA",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Owner {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRUNO" => Ok(Self::Bruno),
            "FERNANDA" => Ok(Self::Fernanda),
            other => Err(EngineError::UnknownValue(format!("unknown owner: {other}"))),
        }
    }
}

/// Direction of the money flow.
///
/// Loans are not a direction of their own: they are expenses whose
/// [`Modality`] is [`Modality::Loan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            other => Err(EngineError::UnknownValue(format!("unknown kind: {other}"))),
        }
    }
}

/// How the money moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Credit,
    #[default]
    Debit,
    Loan,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Credit, Modality::Debit, Modality::Loan];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Loan => "loan",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "loan" => Ok(Self::Loan),
            other => Err(EngineError::UnknownValue(format!("unknown modality: {other}"))),
        }
    }
}

/// Position of an entry inside an installment plan (`index` of `count`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Installment {
    pub index: u32,
    pub count: u32,
}

impl Installment {
    #[must_use]
    pub const fn new(index: u32, count: u32) -> Self {
        Self { index, count }
    }

    /// `true` when the entry belongs to a plan of more than one month.
    #[must_use]
    pub const fn is_series(self) -> bool {
        self.count > 1
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

/// An entry as entered by the user, before the store assigns an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub name: String,
    pub kind: Kind,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub settled: bool,
    pub modality: Modality,
    pub owner: Owner,
    pub recurring: bool,
    pub installment: Option<Installment>,
}

impl EntryDraft {
    /// A pending, non-recurring debit entry with no location or description.
    pub fn new(
        owner: Owner,
        kind: Kind,
        name: impl Into<String>,
        amount: MoneyCents,
        date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            amount,
            date,
            location: String::new(),
            description: String::new(),
            settled: false,
            modality: Modality::default(),
            owner,
            recurring: false,
            installment: None,
        }
    }

    /// Bucket derived from `date`.
    #[must_use]
    pub fn competence(&self) -> Competence {
        Competence::from_date(self.date)
    }

    /// Checks the fields required before anything is sent to the store.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::Validation("name is required".to_string()));
        }
        if self.amount.is_negative() {
            return Err(EngineError::Validation(
                "amount must not be negative".to_string(),
            ));
        }
        Competence::checked_from_date(self.date)?;
        if let Some(installment) = self.installment {
            if installment.index == 0 || installment.count == 0 {
                return Err(EngineError::Validation(
                    "installment index and count must be >= 1".to_string(),
                ));
            }
            if installment.index > installment.count {
                return Err(EngineError::Validation(format!(
                    "installment {installment} exceeds its plan"
                )));
            }
        }
        Ok(())
    }
}

/// A persisted entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub created_at: Option<DateTime<Utc>>,
    pub name: String,
    pub kind: Kind,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub location: String,
    pub description: String,
    pub settled: bool,
    pub modality: Modality,
    pub owner: Owner,
    pub recurring: bool,
    pub installment: Option<Installment>,
}

impl Entry {
    pub fn from_draft(id: EntryId, created_at: Option<DateTime<Utc>>, draft: EntryDraft) -> Self {
        Self {
            id,
            created_at,
            name: draft.name,
            kind: draft.kind,
            amount: draft.amount,
            date: draft.date,
            location: draft.location,
            description: draft.description,
            settled: draft.settled,
            modality: draft.modality,
            owner: draft.owner,
            recurring: draft.recurring,
            installment: draft.installment,
        }
    }

    /// Editable copy of this entry, used to build updates.
    #[must_use]
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            name: self.name.clone(),
            kind: self.kind,
            amount: self.amount,
            date: self.date,
            location: self.location.clone(),
            description: self.description.clone(),
            settled: self.settled,
            modality: self.modality,
            owner: self.owner,
            recurring: self.recurring,
            installment: self.installment,
        }
    }

    /// Bucket derived from `date`.
    #[must_use]
    pub fn competence(&self) -> Competence {
        Competence::from_date(self.date)
    }

    #[must_use]
    pub fn is_income(&self) -> bool {
        self.kind == Kind::Income
    }

    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.settled
    }

    /// Case-insensitive substring match on name, location or description.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        [&self.name, &self.location, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {} {} {}",
            self.id, self.date, self.kind, self.amount, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        EntryDraft::new(
            Owner::Bruno,
            Kind::Expense,
            "Market",
            MoneyCents::new(2000),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn competence_follows_date() {
        let mut d = draft();
        assert_eq!(d.competence().to_string(), "2024/01");
        d.date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(d.competence().to_string(), "2025/11");

        let entry = Entry::from_draft(EntryId(1), None, d);
        assert_eq!(entry.competence().to_string(), "2025/11");
    }

    #[test]
    fn validate_requires_name() {
        let mut d = draft();
        d.name = "   ".to_string();
        assert!(matches!(d.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn validate_rejects_negative_amount() {
        let mut d = draft();
        d.amount = MoneyCents::new(-1);
        assert!(d.validate().is_err());
        d.amount = MoneyCents::ZERO;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn validate_checks_installment_bounds() {
        let mut d = draft();
        d.installment = Some(Installment::new(3, 2));
        assert!(d.validate().is_err());
        d.installment = Some(Installment::new(0, 2));
        assert!(d.validate().is_err());
        d.installment = Some(Installment::new(2, 2));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn validate_keeps_dates_within_four_digit_years() {
        let mut d = draft();
        d.date = NaiveDate::from_ymd_opt(-1, 3, 1).unwrap();
        assert!(matches!(d.validate(), Err(EngineError::InvalidDate(_))));
        d.date = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(d.validate().is_err());
        d.date = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn draft_round_trips_through_entry() {
        let d = draft();
        let entry = Entry::from_draft(EntryId(7), None, d.clone());
        assert_eq!(entry.to_draft(), d);
    }

    #[test]
    fn mentions_searches_three_fields() {
        let mut entry = Entry::from_draft(EntryId(1), None, draft());
        entry.location = "Nubank".to_string();
        entry.description = "Weekly groceries".to_string();
        assert!(entry.mentions("market"));
        assert!(entry.mentions("nubank"));
        assert!(entry.mentions("grocer"));
        assert!(!entry.mentions("pharmacy"));
    }

    #[test]
    fn owner_parses_case_insensitively() {
        assert_eq!("fernanda".parse::<Owner>().unwrap(), Owner::Fernanda);
        assert_eq!(Owner::Bruno.to_string(), "BRUNO");
        assert!("someone".parse::<Owner>().is_err());
    }
}
