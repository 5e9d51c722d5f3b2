//! Owner-scoped view over the record store.
//!
//! [`Dashboard`] keeps the selected owner's entries in memory, derives every
//! figure from them on demand and routes mutations through the store,
//! reloading afterwards so the in-memory list always mirrors the store.

use engine::{
    BatchSelection, Entry, EntryDraft, EntryId, MoneyCents, Owner, PendingScope, PeriodFilter,
    PeriodStats, Report, UnboundedStats, expand_installments, filter_entries,
};

use crate::{
    error::{ClientError, Result},
    session::{Session, SessionSubscription},
    store::RecordStore,
};

/// Receipt for an issued fetch.
///
/// A result is applied only when its ticket is newer than the last applied
/// one and was issued for the owner still selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    owner: Owner,
}

impl FetchTicket {
    pub fn owner(self) -> Owner {
        self.owner
    }
}

#[derive(Debug)]
pub struct Dashboard<S> {
    store: S,
    session: SessionSubscription,
    owner: Owner,
    period: PeriodFilter,
    search: Option<String>,
    entries: Vec<Entry>,
    selection: BatchSelection,
    loading: bool,
    issued: u64,
    applied: u64,
}

impl<S: RecordStore> Dashboard<S> {
    pub fn new(store: S, session: SessionSubscription, owner: Owner, period: PeriodFilter) -> Self {
        Self {
            store,
            session,
            owner,
            period,
            search: None,
            entries: Vec::new(),
            selection: BatchSelection::new(),
            loading: false,
            issued: 0,
            applied: 0,
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Switches owner. The previous owner's entries and selection are dropped
    /// and any fetch still in flight for them will be ignored.
    pub fn set_owner(&mut self, owner: Owner) {
        if owner == self.owner {
            return;
        }
        tracing::debug!(from = %self.owner, to = %owner, "owner changed");
        self.owner = owner;
        self.entries.clear();
        self.selection.clear();
    }

    pub fn period(&self) -> PeriodFilter {
        self.period
    }

    pub fn set_period(&mut self, period: PeriodFilter) {
        self.period = period;
    }

    /// Moves the period by `offset` months; the period is left unchanged
    /// when the move leaves the supported years.
    pub fn shift_period(&mut self, offset: i32) -> Result<()> {
        self.period = self.period.shift(offset)?;
        Ok(())
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn set_search(&mut self, term: Option<String>) {
        self.search = term.filter(|t| !t.trim().is_empty());
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_signed_in()
    }

    /// The owner's entries, newest first. Empty while signed out.
    pub fn entries(&self) -> &[Entry] {
        if self.is_signed_in() {
            &self.entries
        } else {
            &[]
        }
    }

    pub fn filtered(&self) -> Vec<&Entry> {
        filter_entries(self.entries(), &self.period, self.search())
    }

    pub fn unbounded_stats(&self) -> UnboundedStats {
        UnboundedStats::compute(self.entries())
    }

    pub fn period_stats(&self) -> PeriodStats {
        PeriodStats::compute(self.filtered())
    }

    pub fn report(&self) -> Report {
        Report::build(self.filtered())
    }

    pub fn pending(&self, scope: PendingScope) -> Vec<&Entry> {
        scope.visible(self.entries(), &self.filtered())
    }

    pub fn selection(&self) -> &BatchSelection {
        &self.selection
    }

    pub fn toggle(&mut self, id: EntryId) -> bool {
        self.selection.toggle(id)
    }

    /// Selects every visible pending entry of `scope`, or clears the
    /// selection when all of them are already selected.
    pub fn toggle_all(&mut self, scope: PendingScope) {
        let ids: Vec<EntryId> = self.pending(scope).iter().map(|e| e.id).collect();
        self.selection.toggle_all(&ids);
    }

    pub fn selected_total(&self, scope: PendingScope) -> MoneyCents {
        self.selection.selected_total(self.pending(scope))
    }

    fn active_session(&mut self) -> Result<Session> {
        if self.session.has_changed() && self.session.mark_seen().is_none() {
            tracing::info!("session ended; hiding entries");
            self.entries.clear();
            self.selection.clear();
        }
        self.session.current().ok_or(ClientError::Unauthenticated)
    }

    /// Issues a ticket for a fetch of the current owner and marks the
    /// dashboard as loading.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket {
            generation: self.issued,
            owner: self.owner,
        }
    }

    /// Applies the result of the fetch behind `ticket`.
    ///
    /// Returns `Ok(false)` when the result was stale and dropped. On failure
    /// the previously loaded entries stay in place.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Entry>>,
    ) -> Result<bool> {
        if ticket.generation == self.issued {
            self.loading = false;
        }
        if ticket.generation <= self.applied || ticket.owner != self.owner {
            tracing::debug!(generation = ticket.generation, owner = %ticket.owner, "dropping stale fetch");
            return Ok(false);
        }

        match result {
            Ok(entries) => {
                let (mine, foreign): (Vec<Entry>, Vec<Entry>) = entries
                    .into_iter()
                    .partition(|e| e.owner == ticket.owner);
                if !foreign.is_empty() {
                    tracing::warn!(count = foreign.len(), owner = %ticket.owner, "store returned entries of another owner");
                }
                self.applied = ticket.generation;
                self.entries = mine;
                Ok(true)
            }
            Err(err) => {
                tracing::error!("failed to load entries of {}: {err}", ticket.owner);
                Err(err)
            }
        }
    }

    /// Reloads the current owner's entries from the store.
    pub async fn refresh(&mut self) -> Result<()> {
        let session = self.active_session()?;
        let ticket = self.begin_fetch();
        let result = self.store.fetch(&session, ticket.owner).await;
        self.apply_fetch(ticket, result).map(|_| ())
    }

    async fn reload(&mut self) {
        // failures are already logged and keep the previous entries
        if let Err(err) = self.refresh().await {
            tracing::debug!("reload after write skipped: {err}");
        }
    }

    /// Validates `draft`, expands its installment plan and stores every
    /// resulting entry in one request.
    pub async fn create(&mut self, draft: &EntryDraft) -> Result<Vec<Entry>> {
        draft.validate()?;
        let session = self.active_session()?;
        let batch = expand_installments(draft)?;
        let created = self
            .store
            .insert(&session, &batch)
            .await
            .inspect_err(|err| tracing::error!("failed to create entries: {err}"))?;
        tracing::info!(count = created.len(), owner = %draft.owner, "entries created");
        self.reload().await;
        Ok(created)
    }

    /// Replaces entry `id`. Installment plans are not re-expanded on edit.
    pub async fn update(&mut self, id: EntryId, draft: &EntryDraft) -> Result<Entry> {
        draft.validate()?;
        let session = self.active_session()?;
        let entry = self
            .store
            .update(&session, id, draft)
            .await
            .inspect_err(|err| tracing::error!("failed to update entry {id}: {err}"))?;
        tracing::info!(%id, "entry updated");
        self.reload().await;
        Ok(entry)
    }

    pub async fn delete(&mut self, id: EntryId) -> Result<()> {
        let session = self.active_session()?;
        self.store
            .delete(&session, id)
            .await
            .inspect_err(|err| tracing::error!("failed to delete entry {id}: {err}"))?;
        tracing::info!(%id, "entry deleted");
        if self.selection.is_selected(id) {
            self.selection.toggle(id);
        }
        self.reload().await;
        Ok(())
    }

    /// Settles every selected entry in a single request.
    ///
    /// Returns how many rows the store settled, which is lower than the
    /// selection size when some selected rows no longer exist. On success
    /// the selection is cleared; on failure it is kept so the commit can be
    /// retried.
    pub async fn settle_selected(&mut self) -> Result<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let session = self.active_session()?;
        let ids = self.selection.ids();
        let settled = self
            .store
            .settle(&session, &ids)
            .await
            .inspect_err(|err| tracing::error!("failed to settle {} entries: {err}", ids.len()))?;
        if settled == ids.len() {
            tracing::info!(count = settled, "entries settled");
        } else {
            tracing::warn!(settled, selected = ids.len(), "settlement was partial");
        }
        self.selection.clear();
        self.reload().await;
        Ok(settled)
    }

    /// Ends the dashboard, releasing its session subscription.
    pub fn close(self) {
        self.session.unsubscribe();
    }
}
