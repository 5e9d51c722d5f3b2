//! Selection of pending entries for bulk settlement.

use std::collections::BTreeSet;

use crate::{Entry, EntryId, Kind, MoneyCents};

/// Which pending subset is on display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingScope {
    /// Pending incomes over the owner's whole history.
    Incomes,
    /// Pending expenses inside the current period filter.
    Expenses,
}

impl PendingScope {
    /// The pending entries of this scope.
    ///
    /// `all` is the owner's full set, `filtered` the period filter output.
    pub fn visible<'a>(self, all: &'a [Entry], filtered: &[&'a Entry]) -> Vec<&'a Entry> {
        match self {
            Self::Incomes => all
                .iter()
                .filter(|e| e.kind == Kind::Income && e.is_pending())
                .collect(),
            Self::Expenses => filtered
                .iter()
                .copied()
                .filter(|e| e.kind == Kind::Expense && e.is_pending())
                .collect(),
        }
    }
}

/// Entry ids chosen by the user for bulk settlement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSelection {
    selected: BTreeSet<EntryId>,
}

impl BatchSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: EntryId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// `true` when `visible` is non-empty and every id in it is selected.
    pub fn all_selected(&self, visible: &[EntryId]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    /// Deselects every visible id when all of them are selected, otherwise
    /// selects all of them. Ids outside `visible` are left alone.
    pub fn toggle_all(&mut self, visible: &[EntryId]) {
        if self.all_selected(visible) {
            for id in visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible.iter().copied());
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: EntryId) -> bool {
        self.selected.contains(&id)
    }

    /// Sum of the amounts of the given entries that are selected.
    pub fn selected_total<'a>(&self, entries: impl IntoIterator<Item = &'a Entry>) -> MoneyCents {
        entries
            .into_iter()
            .filter(|e| self.selected.contains(&e.id))
            .map(|e| e.amount)
            .sum()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.selected.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::*;
    use crate::{EntryDraft, Owner};

    fn entry(id: i64, kind: Kind, cents: i64, settled: bool, month: u32) -> Entry {
        let mut draft = EntryDraft::new(
            Owner::Bruno,
            kind,
            format!("e{id}"),
            MoneyCents::new(cents),
            NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
        );
        draft.settled = settled;
        Entry::from_draft(EntryId(id), None, draft)
    }

    #[test]
    fn toggle_flips() {
        let mut sel = BatchSelection::new();
        assert!(sel.toggle(EntryId(1)));
        assert!(sel.is_selected(EntryId(1)));
        assert!(!sel.toggle(EntryId(1)));
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_all_completes_partial_selection_then_clears() {
        let visible = [EntryId(1), EntryId(2), EntryId(3)];
        let mut sel = BatchSelection::new();
        sel.toggle(EntryId(2));
        sel.toggle(EntryId(99));

        sel.toggle_all(&visible);
        assert!(sel.all_selected(&visible));

        sel.toggle_all(&visible);
        assert!(visible.iter().all(|id| !sel.is_selected(*id)));
        assert!(sel.is_selected(EntryId(99)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn toggle_all_on_empty_view_is_noop() {
        let mut sel = BatchSelection::new();
        sel.toggle(EntryId(5));
        sel.toggle_all(&[]);
        assert_eq!(sel.ids(), vec![EntryId(5)]);
    }

    #[test]
    fn selected_total_counts_only_selected() {
        let data = vec![
            entry(1, Kind::Expense, 1_000, false, 1),
            entry(2, Kind::Expense, 2_500, false, 1),
            entry(3, Kind::Expense, 4_000, false, 1),
        ];
        let mut sel = BatchSelection::new();
        sel.toggle(EntryId(1));
        sel.toggle(EntryId(3));
        assert_eq!(sel.selected_total(&data), MoneyCents::new(5_000));
    }

    #[test]
    fn scopes_pick_their_pending_subset() {
        let all = vec![
            entry(1, Kind::Income, 100, false, 1),
            entry(2, Kind::Income, 100, true, 1),
            entry(3, Kind::Expense, 100, false, 1),
            entry(4, Kind::Expense, 100, false, 2),
            entry(5, Kind::Income, 100, false, 2),
        ];
        let filtered: Vec<&Entry> = all.iter().filter(|e| e.date.month0() == 0).collect();

        let incomes: Vec<_> = PendingScope::Incomes
            .visible(&all, &filtered)
            .iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(incomes, vec![1, 5]);

        let expenses: Vec<_> = PendingScope::Expenses
            .visible(&all, &filtered)
            .iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(expenses, vec![3]);
    }
}
