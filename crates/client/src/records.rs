//! Conversions between store rows and engine entries.
use api_types::record::{Record, RecordModality, RecordOwner, RecordType, RecordWrite};
use chrono::Utc;
use engine::{
    Competence, EngineError, Entry, EntryDraft, EntryId, Installment, Kind, Modality, MoneyCents,
    Owner,
};

use crate::error::{ClientError, Result};

pub(crate) fn owner_label(owner: Owner) -> RecordOwner {
    match owner {
        Owner::Bruno => RecordOwner::Bruno,
        Owner::Fernanda => RecordOwner::Fernanda,
    }
}

fn owner_from(label: RecordOwner) -> Owner {
    match label {
        RecordOwner::Bruno => Owner::Bruno,
        RecordOwner::Fernanda => Owner::Fernanda,
    }
}

fn kind_label(kind: Kind) -> RecordType {
    match kind {
        Kind::Income => RecordType::Entrada,
        Kind::Expense => RecordType::Saida,
    }
}

// Loans are an expense modality; the legacy loan type reads as an expense.
fn kind_from(label: RecordType) -> Kind {
    match label {
        RecordType::Entrada => Kind::Income,
        RecordType::Saida | RecordType::Emprestimo => Kind::Expense,
    }
}

fn modality_label(modality: Modality) -> RecordModality {
    match modality {
        Modality::Credit => RecordModality::Credito,
        Modality::Debit => RecordModality::Debito,
        Modality::Loan => RecordModality::Emprestimo,
    }
}

fn modality_from(label: RecordModality) -> Modality {
    match label {
        RecordModality::Credito => Modality::Credit,
        RecordModality::Debito => Modality::Debit,
        RecordModality::Emprestimo => Modality::Loan,
    }
}

/// Row body for `draft`. The competence column is always derived from the
/// date.
pub(crate) fn record_write(draft: &EntryDraft) -> RecordWrite {
    RecordWrite {
        name: draft.name.clone(),
        kind: kind_label(draft.kind),
        amount: draft.amount.to_major(),
        competence: draft.competence().to_string(),
        date: draft.date,
        location: draft.location.clone(),
        description: draft.description.clone(),
        status: draft.settled,
        modality: modality_label(draft.modality),
        owner: owner_label(draft.owner),
        recurring: draft.recurring,
        installment_index: draft.installment.map(|i| i.index),
        installment_count: draft.installment.map(|i| i.count),
    }
}

pub(crate) fn entry_from_record(record: Record) -> Result<Entry> {
    let id = record.id;
    let invalid = |source| ClientError::InvalidRecord { id, source };

    let amount = MoneyCents::from_major(record.amount).map_err(invalid)?;
    if amount.is_negative() {
        return Err(invalid(EngineError::InvalidAmount(format!(
            "negative amount {}",
            record.amount
        ))));
    }

    let derived = Competence::from_date(record.date);
    if let Some(stored) = record.competence.as_deref()
        && stored.parse::<Competence>().ok() != Some(derived)
    {
        tracing::warn!(id, stored, %derived, "stored competence disagrees with date; using the date");
    }

    let installment = match (record.installment_index, record.installment_count) {
        (Some(index), Some(count)) => Some(Installment::new(index, count)),
        _ => None,
    };

    Ok(Entry {
        id: EntryId(id),
        created_at: record.created_at.map(|at| at.with_timezone(&Utc)),
        name: record.name.unwrap_or_default(),
        kind: kind_from(record.kind),
        amount,
        date: record.date,
        location: record.location.unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        settled: record.status,
        modality: modality_from(record.modality),
        owner: owner_from(record.owner),
        recurring: record.recurring,
        installment,
    })
}

/// Converts fetched rows, leaving out the ones that do not form a valid
/// entry so a single bad row does not hide the rest.
pub(crate) fn entries_from_records(records: Vec<Record>) -> Vec<Entry> {
    records
        .into_iter()
        .filter_map(|record| {
            entry_from_record(record)
                .inspect_err(|err| tracing::warn!("skipping stored row: {err}"))
                .ok()
        })
        .collect()
}
