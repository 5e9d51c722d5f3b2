//! Plain-text rendering of entries and figures.
use std::io::{self, Write};

use engine::{
    Competence, Entry, MoneyCents, PeriodFilter, PeriodStats, Report, UnboundedStats,
    share_percent,
};

fn status(entry: &Entry) -> &'static str {
    if entry.settled { "settled" } else { "pending" }
}

pub fn entries(out: &mut impl Write, entries: &[&Entry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "no entries");
    }
    for entry in entries {
        let installment = entry
            .installment
            .filter(|i| i.is_series())
            .map(|i| format!(" [{i}]"))
            .unwrap_or_default();
        writeln!(
            out,
            "#{:<6} {}  {:<7} {:<24} {:>16}  {:<7} {}{}",
            entry.id.0,
            entry.date,
            entry.kind.to_string(),
            entry.name,
            entry.amount.to_string(),
            status(entry),
            entry.modality,
            installment,
        )?;
    }
    Ok(())
}

pub fn summary(
    out: &mut impl Write,
    period: PeriodFilter,
    unbounded: &UnboundedStats,
    stats: &PeriodStats,
) -> io::Result<()> {
    writeln!(out, "All time")?;
    writeln!(out, "  available balance  {:>16}", unbounded.available_balance.to_string())?;
    writeln!(out, "  settled income     {:>16}", unbounded.settled_income.to_string())?;
    writeln!(out, "  settled expenses   {:>16}", unbounded.settled_expense.to_string())?;
    writeln!(out, "  pending income     {:>16}", unbounded.pending_income.to_string())?;
    writeln!(out, "  all expenses       {:>16}", unbounded.expense_total.to_string())?;
    writeln!(out)?;
    writeln!(out, "Period {period}")?;
    writeln!(out, "  settled income     {:>16}", stats.settled_income.to_string())?;
    writeln!(out, "  expenses           {:>16}", stats.expense_total.to_string())?;
    writeln!(out, "  pending expenses   {:>16}", stats.pending_expense.to_string())?;
    writeln!(out, "  pending loans      {:>16}", stats.pending_loans.to_string())?;
    writeln!(out, "  balance            {:>16}", stats.balance.to_string())
}

pub fn report(out: &mut impl Write, period: PeriodFilter, report: &Report) -> io::Result<()> {
    writeln!(out, "Period {period}")?;
    writeln!(
        out,
        "  income {} ({:.1}%)  expenses {} ({:.1}%)",
        report.income_total,
        report.income_share(),
        report.expense_total,
        share_percent(report.expense_total, report.income_total),
    )?;

    writeln!(out, "By modality")?;
    for (modality, total) in &report.by_modality {
        writeln!(out, "  {:<10} {:>16}", modality.to_string(), total.to_string())?;
    }
    writeln!(out, "By status")?;
    for (status, total) in &report.by_status {
        writeln!(out, "  {:<10} {:>16}", status.to_string(), total.to_string())?;
    }
    writeln!(out, "By name")?;
    for group in &report.by_name {
        writeln!(
            out,
            "  {:<24} {:>16}  x{}",
            group.name,
            group.total.to_string(),
            group.count
        )?;
    }
    Ok(())
}

pub fn total(out: &mut impl Write, label: &str, amount: MoneyCents) -> io::Result<()> {
    writeln!(out, "{label}: {amount}")
}

/// Reports a bulk settlement, calling out rows the store no longer had.
pub fn settlement(out: &mut impl Write, selected: usize, settled: usize) -> io::Result<()> {
    if settled == selected {
        writeln!(out, "settled {settled} entries")
    } else {
        writeln!(
            out,
            "settled {settled} of {selected} selected entries; the rest no longer exist"
        )
    }
}

pub fn months(out: &mut impl Write, months: &[Competence], current: Competence) -> io::Result<()> {
    for month in months {
        let marker = if *month == current { "*" } else { " " };
        writeln!(out, "{marker} {month}")?;
    }
    Ok(())
}
