use chrono::{Datelike, NaiveDate};

use engine::{
    BatchSelection, Competence, Entry, EntryDraft, EntryId, Installment, Kind, Modality,
    MoneyCents, Owner, PendingScope, PeriodFilter, PeriodStats, Report, UnboundedStats,
    expand_installments, filter_entries,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn comp(s: &str) -> Competence {
    s.parse().unwrap()
}

/// Assigns ids the way the store would and returns persisted entries.
fn persist(drafts: Vec<EntryDraft>) -> Vec<Entry> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| Entry::from_draft(EntryId(i as i64 + 1), None, d))
        .collect()
}

fn draft(kind: Kind, name: &str, cents: i64, settled: bool, on: NaiveDate) -> EntryDraft {
    let mut d = EntryDraft::new(Owner::Bruno, kind, name, MoneyCents::new(cents), on);
    d.settled = settled;
    d
}

#[test]
fn competence_always_matches_date() {
    let dates = [date(2024, 1, 1), date(2024, 12, 31), date(1999, 7, 4), date(2031, 2, 28)];
    for d in dates {
        let entry = Entry::from_draft(
            EntryId(1),
            None,
            draft(Kind::Expense, "x", 1, false, d),
        );
        assert_eq!(
            entry.competence().to_string(),
            format!("{:04}/{:02}", d.year(), d.month())
        );
    }
}

#[test]
fn installment_plan_feeds_monthly_views() {
    let mut phone = draft(Kind::Expense, "Phone", 30_000, true, date(2024, 1, 15));
    phone.modality = Modality::Credit;
    phone.installment = Some(Installment::new(1, 3));

    let entries = persist(expand_installments(&phone).unwrap());
    assert_eq!(entries.len(), 3);

    for (month, settled) in [("2024/01", true), ("2024/02", false), ("2024/03", false)] {
        let view = filter_entries(&entries, &PeriodFilter::Month(comp(month)), None);
        assert_eq!(view.len(), 1, "one installment in {month}");
        assert_eq!(view[0].settled, settled);

        let stats = PeriodStats::compute(view.iter().copied());
        assert_eq!(stats.expense_total, MoneyCents::new(30_000));
    }

    let quarter = PeriodFilter::Range {
        start: comp("2024/01"),
        end: comp("2024/03"),
    };
    let view = filter_entries(&entries, &quarter, Some("phone"));
    let report = Report::build(view.iter().copied());
    assert_eq!(report.by_name.len(), 1);
    assert_eq!(report.by_name[0].count, 3);
    assert_eq!(report.by_name[0].total, MoneyCents::new(90_000));
    assert_eq!(
        report.by_modality.get(&Modality::Credit),
        Some(&MoneyCents::new(90_000))
    );
}

#[test]
fn inverted_range_is_empty_regardless_of_data() {
    let entries = persist(vec![
        draft(Kind::Income, "a", 100, true, date(2024, 1, 1)),
        draft(Kind::Expense, "b", 100, true, date(2024, 6, 1)),
    ]);
    let period = PeriodFilter::Range {
        start: comp("2024/06"),
        end: comp("2024/01"),
    };
    assert!(filter_entries(&entries, &period, None).is_empty());
}

#[test]
fn aggregates_over_reference_set() {
    let entries = persist(vec![
        draft(Kind::Income, "Salary", 10_000, true, date(2024, 1, 5)),
        draft(Kind::Expense, "Rent", 4_000, true, date(2024, 1, 6)),
        draft(Kind::Expense, "Power", 1_000, false, date(2024, 1, 7)),
    ]);

    let unbounded = UnboundedStats::compute(&entries);
    assert_eq!(unbounded.available_balance, MoneyCents::new(6_000));

    let view = filter_entries(&entries, &PeriodFilter::Month(comp("2024/01")), None);
    let period = PeriodStats::compute(view.iter().copied());
    assert_eq!(period.expense_total, MoneyCents::new(5_000));
    assert_eq!(period.pending_expense, MoneyCents::new(1_000));
}

#[test]
fn market_outranks_smaller_single_entries() {
    let on = date(2024, 3, 3);
    let entries = persist(vec![
        draft(Kind::Expense, "Gas", 4_900, true, on),
        draft(Kind::Expense, "Market", 2_000, true, on),
        draft(Kind::Expense, "Market", 3_000, false, on),
    ]);
    let report = Report::build(&entries);
    assert_eq!(report.by_name[0].name, "Market");
    assert_eq!(report.by_name[0].total, MoneyCents::new(5_000));
    assert_eq!(report.by_name[0].count, 2);
    assert_eq!(report.by_name[1].name, "Gas");
}

#[test]
fn toggle_all_over_pending_expenses() {
    let on = date(2024, 4, 10);
    let entries = persist(vec![
        draft(Kind::Expense, "a", 100, false, on),
        draft(Kind::Expense, "b", 200, false, on),
        draft(Kind::Expense, "c", 300, true, on),
        draft(Kind::Income, "d", 400, false, on),
    ]);
    let filtered = filter_entries(&entries, &PeriodFilter::All, None);
    let visible = PendingScope::Expenses.visible(&entries, &filtered);
    let ids: Vec<EntryId> = visible.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![EntryId(1), EntryId(2)]);

    let mut selection = BatchSelection::new();
    selection.toggle(EntryId(2));
    selection.toggle_all(&ids);
    assert!(ids.iter().all(|id| selection.is_selected(*id)));
    assert_eq!(
        selection.selected_total(visible.iter().copied()),
        MoneyCents::new(300)
    );

    selection.toggle_all(&ids);
    assert!(selection.is_empty());
}
