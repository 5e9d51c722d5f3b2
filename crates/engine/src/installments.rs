//! Expansion of an installment plan into one entry per month.

use chrono::Months;

use crate::{Competence, EngineError, EntryDraft, Installment, ResultEngine};

/// Expands a draft carrying installment `I` of `N` into the entries for
/// installments `I..=N`, one per calendar month starting at the draft's date.
///
/// - The k-th produced entry is dated `k` months after the original date,
///   keeping the day of month; days past the end of a shorter month are
///   clamped to its last day (Jan 31 -> Feb 29 -> Mar 31).
/// - Only the first produced entry keeps the draft's `settled` flag, later
///   installments are pending.
/// - Fails with [`EngineError::InvalidDate`] when an installment lands past
///   year 9999.
/// - Drafts without a plan (`N <= 1`, `I > N`, or no installment data) come
///   back unchanged as a single entry.
///
/// The caller is expected to persist the result as one batch.
pub fn expand_installments(draft: &EntryDraft) -> ResultEngine<Vec<EntryDraft>> {
    let Some(Installment { index, count }) = draft.installment else {
        return Ok(vec![draft.clone()]);
    };
    if count <= 1 || index > count {
        return Ok(vec![draft.clone()]);
    }

    (index..=count)
        .map(|k| {
            let step = k - index;
            let date = draft.date.checked_add_months(Months::new(step)).ok_or_else(|| {
                EngineError::InvalidDate(format!(
                    "installment {k} of {count} falls outside the calendar"
                ))
            })?;
            Competence::checked_from_date(date)?;
            Ok(EntryDraft {
                date,
                settled: step == 0 && draft.settled,
                installment: Some(Installment::new(k, count)),
                ..draft.clone()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Kind, MoneyCents, Owner};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(index: u32, count: u32, on: NaiveDate, settled: bool) -> EntryDraft {
        let mut draft = EntryDraft::new(
            Owner::Fernanda,
            Kind::Expense,
            "Notebook",
            MoneyCents::new(50_000),
            on,
        );
        draft.settled = settled;
        draft.installment = Some(Installment::new(index, count));
        draft
    }

    #[test]
    fn three_month_plan_from_first_installment() {
        let out = expand_installments(&plan(1, 3, date(2024, 1, 15), true)).unwrap();

        let dates: Vec<_> = out.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 15), date(2024, 2, 15), date(2024, 3, 15)]);
        let settled: Vec<_> = out.iter().map(|e| e.settled).collect();
        assert_eq!(settled, vec![true, false, false]);
        let idx: Vec<_> = out
            .iter()
            .map(|e| e.installment.map(|i| (i.index, i.count)))
            .collect();
        assert_eq!(idx, vec![Some((1, 3)), Some((2, 3)), Some((3, 3))]);
        let comps: Vec<_> = out.iter().map(|e| e.competence().to_string()).collect();
        assert_eq!(comps, vec!["2024/01", "2024/02", "2024/03"]);
        assert!(out.iter().all(|e| e.name == "Notebook" && e.amount.cents() == 50_000));
    }

    #[test]
    fn starts_midway_through_plan() {
        let out = expand_installments(&plan(4, 6, date(2024, 11, 5), false)).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].installment, Some(Installment::new(4, 6)));
        assert_eq!(out[2].installment, Some(Installment::new(6, 6)));
        assert_eq!(out[2].date, date(2025, 1, 5));
        assert!(out.iter().all(|e| !e.settled));
    }

    #[test]
    fn clamps_day_to_end_of_month() {
        let out = expand_installments(&plan(1, 4, date(2024, 1, 31), false)).unwrap();
        let dates: Vec<_> = out.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
    }

    #[test]
    fn plan_running_past_year_9999_fails() {
        let draft = plan(1, 2, date(9999, 12, 15), false);
        assert!(matches!(
            expand_installments(&draft),
            Err(EngineError::InvalidDate(_))
        ));

        let last = plan(2, 2, date(9999, 12, 15), false);
        assert_eq!(expand_installments(&last).unwrap().len(), 1);
    }

    #[test]
    fn no_plan_yields_the_draft_unchanged() {
        let single = plan(1, 1, date(2024, 5, 1), true);
        assert_eq!(expand_installments(&single).unwrap(), vec![single.clone()]);

        let overflow = plan(5, 3, date(2024, 5, 1), true);
        assert_eq!(expand_installments(&overflow).unwrap(), vec![overflow.clone()]);

        let mut bare = single;
        bare.installment = None;
        assert_eq!(expand_installments(&bare).unwrap(), vec![bare.clone()]);
    }
}
