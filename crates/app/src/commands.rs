//! Command handlers.
//!
//! A [`Context`] lives for one invocation: it restores the persisted session,
//! runs a single [`Command`] against the dashboard and hands the state to
//! persist back to the caller.

use std::io::{BufRead, Write};

use chrono::{DateTime, Local, NaiveDate, Utc};
use client::{Authenticator, Dashboard, IdentityProvider, RecordStore, SessionHub, SignUp};
use engine::{Competence, EntryDraft, EntryId, MoneyCents, Owner, PendingScope, PeriodFilter};

use crate::{
    config::Command,
    error::{AppError, Result},
    local_state::LocalState,
    render,
};

/// Months shown before and after the reference month by `months`.
const MONTHS_BACK: u32 = 24;
const MONTHS_FORWARD: u32 = 12;

pub struct Context<S, P> {
    auth: Authenticator<P>,
    dashboard: Dashboard<S>,
    state: LocalState,
    today: NaiveDate,
}

impl<S: RecordStore, P: IdentityProvider> Context<S, P> {
    /// Restores the persisted session (refreshing it if expired) and picks
    /// the owner: `owner` when given, else the last active one.
    pub async fn open(
        store: S,
        provider: P,
        state: LocalState,
        owner: Option<Owner>,
        now: DateTime<Local>,
    ) -> Self {
        let hub = SessionHub::default();
        let auth = Authenticator::new(provider, hub.clone());
        if let Some(saved) = state.session.clone()
            && let Err(err) = auth.restore(saved, now.with_timezone(&Utc)).await
        {
            tracing::warn!("stored session discarded: {err}");
        }

        let today = now.date_naive();
        let owner = owner.or(state.owner).unwrap_or_default();
        let dashboard = Dashboard::new(
            store,
            hub.subscribe(),
            owner,
            PeriodFilter::Month(Competence::from_date(today)),
        );
        Self {
            auth,
            dashboard,
            state,
            today,
        }
    }

    /// Ends the invocation and returns the state to persist.
    pub fn finish(self) -> LocalState {
        let mut state = self.state;
        state.session = self.auth.hub().current();
        state.owner = Some(self.dashboard.owner());
        self.dashboard.close();
        state
    }

    pub async fn execute(
        &mut self,
        command: Command,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        match command {
            Command::Login { email } => {
                let password = read_password(input)?;
                let session = self.auth.sign_in(&email, &password).await?;
                writeln!(out, "signed in as {}", session.email)?;
            }
            Command::Signup { email } => {
                let password = read_password(input)?;
                match self.auth.sign_up(&email, &password).await? {
                    SignUp::SignedIn(session) => {
                        writeln!(out, "account created, signed in as {}", session.email)?;
                    }
                    SignUp::ConfirmationRequired { email } => writeln!(
                        out,
                        "check {email} for a confirmation link, then run `finance login`"
                    )?,
                }
            }
            Command::Logout => {
                if self.auth.sign_out().await.is_ok() {
                    writeln!(out, "signed out")?;
                } else {
                    writeln!(out, "signed out locally; the provider could not be reached")?;
                }
            }
            Command::Owner { switch_to } => {
                if let Some(owner) = switch_to {
                    self.dashboard.set_owner(owner);
                }
                writeln!(out, "active owner: {}", self.dashboard.owner())?;
            }
            Command::List { period, search } => {
                self.load(period.resolve(self.today)?, search).await?;
                render::entries(out, &self.dashboard.filtered())?;
            }
            Command::Summary { period } => {
                let period = period.resolve(self.today)?;
                self.load(period, None).await?;
                render::summary(
                    out,
                    period,
                    &self.dashboard.unbounded_stats(),
                    &self.dashboard.period_stats(),
                )?;
            }
            Command::Report { period, search } => {
                let period = period.resolve(self.today)?;
                self.load(period, search).await?;
                render::report(out, period, &self.dashboard.report())?;
            }
            Command::Add(args) => {
                let draft = args.into_draft(self.dashboard.owner(), self.today);
                let created = self.dashboard.create(&draft).await?;
                writeln!(out, "created {} entries", created.len())?;
                render::entries(out, &created.iter().collect::<Vec<_>>())?;
            }
            Command::Edit { id, changes } => {
                self.dashboard.refresh().await?;
                let mut draft = self.owned(id)?;
                changes.apply(&mut draft);
                let entry = self.dashboard.update(id, &draft).await?;
                render::entries(out, &[&entry])?;
            }
            Command::Delete { id } => {
                self.dashboard.refresh().await?;
                self.owned(id)?;
                self.dashboard.delete(id).await?;
                writeln!(out, "deleted #{id}")?;
            }
            Command::Pending { scope, period } => {
                self.load(period.resolve(self.today)?, None).await?;
                let scope = PendingScope::from(scope);
                let pending = self.dashboard.pending(scope);
                render::entries(out, &pending)?;
                let total: MoneyCents = pending.iter().map(|e| e.amount).sum();
                render::total(out, "pending total", total)?;
            }
            Command::Settle {
                scope,
                ids,
                all_visible,
                period,
            } => {
                self.load(period.resolve(self.today)?, None).await?;
                let scope = PendingScope::from(scope);
                if all_visible {
                    self.dashboard.toggle_all(scope);
                }
                for id in ids {
                    if !self.dashboard.pending(scope).iter().any(|e| e.id == id) {
                        return Err(AppError::Input(format!(
                            "#{id} is not a pending entry of this view"
                        )));
                    }
                    if !self.dashboard.selection().is_selected(id) {
                        self.dashboard.toggle(id);
                    }
                }
                if self.dashboard.selection().is_empty() {
                    writeln!(out, "nothing to settle")?;
                    return Ok(());
                }
                render::total(out, "selected", self.dashboard.selected_total(scope))?;
                let selected = self.dashboard.selection().len();
                let settled = self.dashboard.settle_selected().await?;
                render::settlement(out, selected, settled)?;
            }
            Command::Months { around } => {
                let current = Competence::from_date(self.today);
                let reference = around.unwrap_or(current);
                render::months(out, &reference.window(MONTHS_BACK, MONTHS_FORWARD), current)?;
            }
        }
        Ok(())
    }

    async fn load(&mut self, period: PeriodFilter, search: Option<String>) -> Result<()> {
        self.dashboard.set_period(period);
        self.dashboard.set_search(search);
        self.dashboard.refresh().await?;
        Ok(())
    }

    fn owned(&self, id: EntryId) -> Result<EntryDraft> {
        self.dashboard
            .entries()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.to_draft())
            .ok_or_else(|| {
                AppError::Input(format!("no entry #{id} for {}", self.dashboard.owner()))
            })
    }
}

fn read_password(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(AppError::Input(
            "password expected in FINANCE_PASSWORD or on stdin".to_string(),
        ));
    }
    Ok(password)
}
