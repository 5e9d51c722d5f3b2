//! Report groups: expenses by modality and by name, all entries by status.

use core::fmt;
use std::collections::{BTreeMap, HashMap};

use crate::{Entry, Kind, Modality, MoneyCents, stats::share_percent};

/// Label used for expenses without a name.
pub const UNNAMED: &str = "Unnamed";

/// Settlement status of an entry, as a grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Settled,
    Pending,
}

impl Status {
    #[must_use]
    pub fn of(entry: &Entry) -> Self {
        if entry.settled {
            Self::Settled
        } else {
            Self::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settled => "settled",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expenses sharing a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameGroup {
    pub name: String,
    pub total: MoneyCents,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Expense totals per modality; only modalities that occur are present.
    pub by_modality: BTreeMap<Modality, MoneyCents>,
    /// Totals of every entry (income and expense) per status.
    pub by_status: BTreeMap<Status, MoneyCents>,
    /// Expense groups, highest total first; equal totals keep first-seen order.
    pub by_name: Vec<NameGroup>,
    pub income_total: MoneyCents,
    pub expense_total: MoneyCents,
}

impl Report {
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut report = Self::default();
        let mut name_index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            *report.by_status.entry(Status::of(entry)).or_default() += entry.amount;

            match entry.kind {
                Kind::Income => report.income_total += entry.amount,
                Kind::Expense => {
                    report.expense_total += entry.amount;
                    *report.by_modality.entry(entry.modality).or_default() += entry.amount;

                    let name = match entry.name.trim() {
                        "" => UNNAMED,
                        _ => entry.name.as_str(),
                    };
                    let slot = *name_index.entry(name.to_string()).or_insert_with(|| {
                        report.by_name.push(NameGroup {
                            name: name.to_string(),
                            total: MoneyCents::ZERO,
                            count: 0,
                        });
                        report.by_name.len() - 1
                    });
                    let group = &mut report.by_name[slot];
                    group.total += entry.amount;
                    group.count += 1;
                }
            }
        }

        // stable: equal totals keep first-seen order
        report.by_name.sort_by(|a, b| b.total.cmp(&a.total));
        report
    }

    /// Income share of the period's flow (income + expense), in percent.
    #[must_use]
    pub fn income_share(&self) -> f64 {
        share_percent(self.income_total, self.expense_total)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{EntryDraft, EntryId, Owner};

    fn entry(id: i64, kind: Kind, name: &str, cents: i64, settled: bool, modality: Modality) -> Entry {
        let mut draft = EntryDraft::new(
            Owner::Bruno,
            kind,
            name,
            MoneyCents::new(cents),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        draft.settled = settled;
        draft.modality = modality;
        Entry::from_draft(EntryId(id), None, draft)
    }

    #[test]
    fn groups_by_name_and_ranks() {
        let data = vec![
            entry(1, Kind::Expense, "Market", 2_000, true, Modality::Debit),
            entry(2, Kind::Expense, "Gym", 4_000, true, Modality::Debit),
            entry(3, Kind::Expense, "Market", 3_000, false, Modality::Credit),
            entry(4, Kind::Income, "Salary", 900_000, true, Modality::Debit),
        ];
        let report = Report::build(&data);

        assert_eq!(
            report.by_name,
            vec![
                NameGroup {
                    name: "Market".to_string(),
                    total: MoneyCents::new(5_000),
                    count: 2
                },
                NameGroup {
                    name: "Gym".to_string(),
                    total: MoneyCents::new(4_000),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let data = vec![
            entry(1, Kind::Expense, "Bus", 500, true, Modality::Debit),
            entry(2, Kind::Expense, "Coffee", 500, true, Modality::Debit),
            entry(3, Kind::Expense, "Book", 900, true, Modality::Debit),
        ];
        let names: Vec<_> = Report::build(&data)
            .by_name
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Book", "Bus", "Coffee"]);
    }

    #[test]
    fn blank_names_use_placeholder() {
        let data = vec![
            entry(1, Kind::Expense, "", 100, true, Modality::Debit),
            entry(2, Kind::Expense, "  ", 200, true, Modality::Debit),
        ];
        let report = Report::build(&data);
        assert_eq!(report.by_name.len(), 1);
        assert_eq!(report.by_name[0].name, UNNAMED);
        assert_eq!(report.by_name[0].count, 2);
    }

    #[test]
    fn modality_status_and_flow_totals() {
        let data = vec![
            entry(1, Kind::Expense, "Card", 1_000, false, Modality::Credit),
            entry(2, Kind::Expense, "Loan", 2_500, false, Modality::Loan),
            entry(3, Kind::Income, "Salary", 10_000, true, Modality::Debit),
            entry(4, Kind::Income, "Refund", 500, false, Modality::Credit),
        ];
        let report = Report::build(&data);

        assert_eq!(report.by_modality.get(&Modality::Credit), Some(&MoneyCents::new(1_000)));
        assert_eq!(report.by_modality.get(&Modality::Loan), Some(&MoneyCents::new(2_500)));
        assert_eq!(report.by_modality.get(&Modality::Debit), None);

        assert_eq!(report.by_status.get(&Status::Settled), Some(&MoneyCents::new(10_000)));
        assert_eq!(report.by_status.get(&Status::Pending), Some(&MoneyCents::new(4_000)));

        assert_eq!(report.income_total, MoneyCents::new(10_500));
        assert_eq!(report.expense_total, MoneyCents::new(3_500));
        assert!((report.income_share() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn empty_report_has_zero_share() {
        let report = Report::build(&Vec::<Entry>::new());
        assert!(report.by_name.is_empty());
        assert_eq!(report.income_share(), 0.0);
    }
}
