//! Core model and computations of the household finance tracker.
//!
//! Everything in this crate is pure: it works on in-memory entry lists and
//! never talks to the record store. The typical flow is
//!
//! 1. the owner's full entry list comes from the store;
//! 2. [`filter_entries`] narrows it to a [`PeriodFilter`] and a search term;
//! 3. [`UnboundedStats`], [`PeriodStats`] and [`Report`] are computed on
//!    demand from the full or the filtered list;
//! 4. [`BatchSelection`] tracks which pending entries to settle in bulk.
//!
//! New entries go through [`expand_installments`] before being stored.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use engine::{Entry, EntryDraft, EntryId, Kind, MoneyCents, Owner, UnboundedStats};
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let mut salary = EntryDraft::new(Owner::Bruno, Kind::Income, "Salary", MoneyCents::new(10_000), date);
//! salary.settled = true;
//! let entries = vec![Entry::from_draft(EntryId(1), None, salary)];
//!
//! let stats = UnboundedStats::compute(&entries);
//! assert_eq!(stats.available_balance, MoneyCents::new(10_000));
//! ```

pub use competence::Competence;
pub use entry::{Entry, EntryDraft, EntryId, Installment, Kind, Modality, Owner};
pub use error::EngineError;
pub use installments::expand_installments;
pub use money::MoneyCents;
pub use period::{PeriodFilter, filter_entries};
pub use reports::{NameGroup, Report, Status, UNNAMED};
pub use selection::{BatchSelection, PendingScope};
pub use stats::{PeriodStats, UnboundedStats, share_percent};

mod competence;
mod entry;
mod error;
mod installments;
mod money;
mod period;
mod reports;
mod selection;
mod stats;

pub type ResultEngine<T> = Result<T, EngineError>;
