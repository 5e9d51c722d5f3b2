//! Summary statistics over a set of entries.
//!
//! Every total is a plain sum of `amount` over the entries matching a
//! predicate; nothing here is cached, callers recompute from the current set.

use crate::{Entry, Kind, Modality, MoneyCents};

/// Totals over an owner's whole history, ignoring the period filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnboundedStats {
    pub settled_income: MoneyCents,
    pub settled_expense: MoneyCents,
    pub pending_income: MoneyCents,
    /// Settled and pending expenses.
    pub expense_total: MoneyCents,
    /// `settled_income - settled_expense`: money actually available.
    pub available_balance: MoneyCents,
}

impl UnboundedStats {
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut stats = entries
            .into_iter()
            .fold(Self::default(), |mut acc, entry| {
                match (entry.kind, entry.settled) {
                    (Kind::Income, true) => acc.settled_income += entry.amount,
                    (Kind::Income, false) => acc.pending_income += entry.amount,
                    (Kind::Expense, true) => acc.settled_expense += entry.amount,
                    (Kind::Expense, false) => {}
                }
                if entry.kind == Kind::Expense {
                    acc.expense_total += entry.amount;
                }
                acc
            });
        stats.available_balance = stats.settled_income - stats.settled_expense;
        stats
    }
}

/// Totals over the entries selected by the period filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodStats {
    pub settled_income: MoneyCents,
    /// Settled and pending expenses.
    pub expense_total: MoneyCents,
    pub pending_expense: MoneyCents,
    /// Unsettled entries with [`Modality::Loan`].
    pub pending_loans: MoneyCents,
    /// `settled_income - expense_total`.
    pub balance: MoneyCents,
}

impl PeriodStats {
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            if entry.kind == Kind::Income && entry.settled {
                stats.settled_income += entry.amount;
            }
            if entry.kind == Kind::Expense {
                stats.expense_total += entry.amount;
                if !entry.settled {
                    stats.pending_expense += entry.amount;
                }
            }
            if entry.modality == Modality::Loan && !entry.settled {
                stats.pending_loans += entry.amount;
            }
        }
        stats.balance = stats.settled_income - stats.expense_total;
        stats
    }
}

/// Share of `part` in `part + other`, as a percentage.
///
/// When both terms are zero the denominator is taken as 1, so the share is 0.
#[must_use]
pub fn share_percent(part: MoneyCents, other: MoneyCents) -> f64 {
    let denominator = match part.cents() + other.cents() {
        0 => 1,
        d => d,
    };
    part.cents() as f64 / denominator as f64 * 100.0
}
