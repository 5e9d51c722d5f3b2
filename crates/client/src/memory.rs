//! In-process [`RecordStore`] and [`IdentityProvider`].
//!
//! Both keep their state behind a `tokio` lock and follow the same contracts
//! as the HTTP implementations, which makes them suitable for tests and
//! local experiments.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use engine::{Entry, EntryDraft, EntryId, Owner};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{ClientError, Result},
    identity::{IdentityProvider, SignUp},
    session::Session,
    store::RecordStore,
};

#[derive(Debug, Default)]
struct StoreState {
    rows: Vec<Entry>,
    last_id: i64,
    offline: bool,
    requests: usize,
}

impl StoreState {
    fn begin(&mut self) -> Result<()> {
        self.requests += 1;
        if self.offline {
            return Err(ClientError::Server("store unavailable".to_string()));
        }
        Ok(())
    }

    fn push(&mut self, draft: EntryDraft) -> Entry {
        self.last_id += 1;
        let entry = Entry::from_draft(EntryId(self.last_id), Some(Utc::now()), draft);
        self.rows.push(entry.clone());
        entry
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts rows directly, without counting as a request.
    pub async fn seed(&self, drafts: Vec<EntryDraft>) -> Vec<Entry> {
        let mut state = self.state.write().await;
        drafts.into_iter().map(|draft| state.push(draft)).collect()
    }

    /// While offline every request fails with a server error.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Number of requests received so far, failed ones included.
    pub async fn requests(&self) -> usize {
        self.state.read().await.requests
    }

    pub async fn rows(&self) -> Vec<Entry> {
        self.state.read().await.rows.clone()
    }
}

impl RecordStore for MemoryStore {
    async fn fetch(&self, _session: &Session, owner: Owner) -> Result<Vec<Entry>> {
        let mut state = self.state.write().await;
        state.begin()?;
        let mut rows: Vec<Entry> = state
            .rows
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert(&self, _session: &Session, drafts: &[EntryDraft]) -> Result<Vec<Entry>> {
        let mut state = self.state.write().await;
        state.begin()?;
        // All-or-nothing: check the whole batch before writing.
        for draft in drafts {
            draft
                .validate()
                .map_err(|err| ClientError::Validation(err.to_string()))?;
        }
        Ok(drafts
            .iter()
            .cloned()
            .map(|draft| state.push(draft))
            .collect())
    }

    async fn update(&self, _session: &Session, id: EntryId, draft: &EntryDraft) -> Result<Entry> {
        let mut state = self.state.write().await;
        state.begin()?;
        draft
            .validate()
            .map_err(|err| ClientError::Validation(err.to_string()))?;
        let row = state
            .rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ClientError::NotFound)?;
        *row = Entry::from_draft(id, row.created_at, draft.clone());
        Ok(row.clone())
    }

    async fn settle(&self, _session: &Session, ids: &[EntryId]) -> Result<usize> {
        let mut state = self.state.write().await;
        state.begin()?;
        let mut changed = 0;
        for row in state.rows.iter_mut().filter(|e| ids.contains(&e.id)) {
            row.settled = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, _session: &Session, id: EntryId) -> Result<()> {
        let mut state = self.state.write().await;
        state.begin()?;
        state.rows.retain(|e| e.id != id);
        Ok(())
    }
}

#[derive(Debug)]
struct Account {
    user_id: Uuid,
    password: String,
}

#[derive(Debug, Default)]
struct IdentityState {
    accounts: HashMap<String, Account>,
    /// refresh token -> account email
    refresh_tokens: HashMap<String, String>,
}

impl IdentityState {
    fn issue(&mut self, email: &str, user_id: Uuid, ttl: Duration) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + ttl,
            user_id,
            email: email.to_string(),
        };
        self.refresh_tokens
            .insert(session.refresh_token.clone(), email.to_string());
        session
    }
}

#[derive(Debug)]
pub struct MemoryIdentity {
    state: RwLock<IdentityState>,
    auto_confirm: bool,
    ttl: Duration,
}

impl MemoryIdentity {
    /// Accounts are active right after sign-up.
    pub fn new() -> Self {
        Self {
            state: RwLock::default(),
            auto_confirm: true,
            ttl: Duration::hours(1),
        }
    }

    /// Sign-up only registers the account; a separate sign-in is needed.
    pub fn requiring_confirmation() -> Self {
        Self {
            auto_confirm: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.to_lowercase();
        let mut state = self.state.write().await;
        let user_id = match state.accounts.get(&email) {
            Some(account) if account.password == password => account.user_id,
            _ => return Err(ClientError::Auth("Invalid login credentials".to_string())),
        };
        Ok(state.issue(&email, user_id, self.ttl))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
        let email = email.to_lowercase();
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&email) {
            return Err(ClientError::Auth("User already registered".to_string()));
        }
        let user_id = Uuid::new_v4();
        state.accounts.insert(
            email.clone(),
            Account {
                user_id,
                password: password.to_string(),
            },
        );
        if !self.auto_confirm {
            return Ok(SignUp::ConfirmationRequired { email });
        }
        Ok(SignUp::SignedIn(state.issue(&email, user_id, self.ttl)))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let mut state = self.state.write().await;
        let email = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| ClientError::Auth("Invalid Refresh Token".to_string()))?;
        let user_id = state
            .accounts
            .get(&email)
            .map(|a| a.user_id)
            .ok_or_else(|| ClientError::Auth("User not found".to_string()))?;
        Ok(state.issue(&email, user_id, self.ttl))
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        self.state
            .write()
            .await
            .refresh_tokens
            .remove(&session.refresh_token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{Kind, MoneyCents};

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "t".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user_id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
        }
    }

    fn draft(owner: Owner, name: &str, day: u32) -> EntryDraft {
        EntryDraft::new(
            owner,
            Kind::Expense,
            name,
            MoneyCents::new(100),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        )
    }

    #[tokio::test]
    async fn fetch_is_owner_scoped_and_newest_first() {
        let store = MemoryStore::new();
        store
            .seed(vec![
                draft(Owner::Bruno, "old", 1),
                draft(Owner::Fernanda, "hers", 20),
                draft(Owner::Bruno, "new", 10),
                draft(Owner::Bruno, "same day", 10),
            ])
            .await;

        let rows = store.fetch(&session(), Owner::Bruno).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["same day", "new", "old"]);
    }

    #[tokio::test]
    async fn invalid_batch_inserts_nothing() {
        let store = MemoryStore::new();
        let batch = vec![draft(Owner::Bruno, "ok", 1), draft(Owner::Bruno, " ", 2)];
        let err = store.insert(&session(), &batch).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(store.rows().await.is_empty());
    }

    #[tokio::test]
    async fn offline_store_fails_and_counts_requests() {
        let store = MemoryStore::new();
        store.set_offline(true).await;
        assert!(store.fetch(&session(), Owner::Bruno).await.is_err());
        assert_eq!(store.requests().await, 1);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update(&session(), EntryId(9), &draft(Owner::Bruno, "x", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound));
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let identity = MemoryIdentity::new();
        identity.sign_up("A@example.com", "pw").await.unwrap();
        assert!(matches!(
            identity.sign_up("a@example.com", "pw").await,
            Err(ClientError::Auth(_))
        ));
    }
}
