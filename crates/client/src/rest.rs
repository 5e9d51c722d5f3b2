//! HTTP implementations of [`RecordStore`] and [`IdentityProvider`].
//!
//! The record store speaks the PostgREST dialect under `rest/v1/<table>`; the
//! identity provider is the GoTrue API under `auth/v1/`. Both need the
//! project's public `apikey`; record requests also carry the session's bearer
//! token.

use api_types::{
    auth::{AuthError, Credentials, RefreshGrant, TokenResponse},
    record::{Record, SettleRecords, StoreError},
};
use chrono::Utc;
use engine::{Entry, EntryDraft, EntryId, Owner};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::{
    error::{ClientError, Result},
    identity::{IdentityProvider, SignUp},
    records::{entries_from_records, entry_from_record, owner_label, record_write},
    session::Session,
    store::RecordStore,
};

pub const DEFAULT_TABLE: &str = "despesas";

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: Url,
    anon_key: String,
    http: reqwest::Client,
}

impl Endpoint {
    fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        // `join` drops the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            anon_key: anon_key.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> Result<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key)))
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    if res.status().is_success() {
        return res.json::<T>().await.map_err(ClientError::Transport);
    }
    Err(store_error(res).await)
}

async fn store_error(res: Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<StoreError>()
        .await
        .map(|err| err.message)
        .unwrap_or_else(|_| "unknown error".to_string());
    ClientError::from_status(status.as_u16(), body)
}

async fn auth_error(res: Response) -> ClientError {
    let status = res.status();
    let body = res.json::<AuthError>().await.unwrap_or_default();
    let message = body
        .readable()
        .unwrap_or("authentication failed")
        .to_string();
    if status.is_client_error() {
        ClientError::Auth(message)
    } else {
        ClientError::Server(message)
    }
}

/// `in.(1,2,3)` filter value.
fn in_filter(ids: &[EntryId]) -> String {
    let list = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({list})")
}

#[derive(Debug, Clone)]
pub struct RestStore {
    endpoint: Endpoint,
    table: String,
}

impl RestStore {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, anon_key)?,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_request(&self, method: Method, session: &Session) -> Result<RequestBuilder> {
        self.endpoint.request(
            method,
            &format!("rest/v1/{}", self.table),
            Some(&session.access_token),
        )
    }

    fn fetch_request(&self, session: &Session, owner: Owner) -> Result<RequestBuilder> {
        let owner_filter = format!("eq.{}", owner_label(owner).as_str());
        Ok(self.table_request(Method::GET, session)?.query(&[
            ("select", "*"),
            ("pessoa", owner_filter.as_str()),
            ("order", "data.desc,id.desc"),
        ]))
    }

    fn insert_request(&self, session: &Session, drafts: &[EntryDraft]) -> Result<RequestBuilder> {
        let rows: Vec<_> = drafts.iter().map(record_write).collect();
        Ok(self
            .table_request(Method::POST, session)?
            .header("Prefer", "return=representation")
            .json(&rows))
    }

    fn update_request(
        &self,
        session: &Session,
        id: EntryId,
        draft: &EntryDraft,
    ) -> Result<RequestBuilder> {
        Ok(self
            .table_request(Method::PATCH, session)?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&record_write(draft)))
    }

    fn settle_request(&self, session: &Session, ids: &[EntryId]) -> Result<RequestBuilder> {
        Ok(self
            .table_request(Method::PATCH, session)?
            .query(&[("id", in_filter(ids).as_str()), ("select", "id")])
            .header("Prefer", "return=representation")
            .json(&SettleRecords { status: true }))
    }

    fn delete_request(&self, session: &Session, id: EntryId) -> Result<RequestBuilder> {
        Ok(self
            .table_request(Method::DELETE, session)?
            .query(&[("id", format!("eq.{id}"))]))
    }
}

impl RecordStore for RestStore {
    async fn fetch(&self, session: &Session, owner: Owner) -> Result<Vec<Entry>> {
        let res = self.fetch_request(session, owner)?.send().await?;
        let rows: Vec<Record> = read_json(res).await?;
        tracing::debug!(owner = %owner, rows = rows.len(), "fetched records");
        Ok(entries_from_records(rows))
    }

    async fn insert(&self, session: &Session, drafts: &[EntryDraft]) -> Result<Vec<Entry>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let res = self.insert_request(session, drafts)?.send().await?;
        let rows: Vec<Record> = read_json(res).await?;
        rows.into_iter().map(entry_from_record).collect()
    }

    async fn update(&self, session: &Session, id: EntryId, draft: &EntryDraft) -> Result<Entry> {
        let res = self.update_request(session, id, draft)?.send().await?;
        let rows: Vec<Record> = read_json(res).await?;
        let row = rows.into_iter().next().ok_or(ClientError::NotFound)?;
        entry_from_record(row)
    }

    async fn settle(&self, session: &Session, ids: &[EntryId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = self.settle_request(session, ids)?.send().await?;
        let rows: Vec<IgnoredAny> = read_json(res).await?;
        Ok(rows.len())
    }

    async fn delete(&self, session: &Session, id: EntryId) -> Result<()> {
        let res = self.delete_request(session, id)?.send().await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(store_error(res).await)
    }
}

#[derive(Debug, Clone)]
pub struct RestIdentity {
    endpoint: Endpoint,
}

impl RestIdentity {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, anon_key)?,
        })
    }

    fn token_request(&self, grant_type: &str) -> Result<RequestBuilder> {
        Ok(self
            .endpoint
            .request(Method::POST, "auth/v1/token", None)?
            .query(&[("grant_type", grant_type)]))
    }

    async fn read_token(res: Response) -> Result<Session> {
        if !res.status().is_success() {
            return Err(auth_error(res).await);
        }
        let token = res.json::<TokenResponse>().await?;
        Ok(Session::from_token(token, Utc::now()))
    }
}

impl IdentityProvider for RestIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let res = self
            .token_request("password")?
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::read_token(res).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
        let res = self
            .endpoint
            .request(Method::POST, "auth/v1/signup", None)?
            .json(&Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(auth_error(res).await);
        }

        // With confirmation enabled the body is the bare user, otherwise a
        // full token grant.
        let body = res.json::<serde_json::Value>().await?;
        if body.get("access_token").is_none() {
            return Ok(SignUp::ConfirmationRequired {
                email: email.to_string(),
            });
        }
        let token = serde_json::from_value::<TokenResponse>(body)
            .map_err(|err| ClientError::Server(format!("unexpected sign-up response: {err}")))?;
        Ok(SignUp::SignedIn(Session::from_token(token, Utc::now())))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let res = self
            .token_request("refresh_token")?
            .json(&RefreshGrant {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;
        Self::read_token(res).await
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let res = self
            .endpoint
            .request(Method::POST, "auth/v1/logout", Some(&session.access_token))?
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(auth_error(res).await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use engine::{Kind, MoneyCents};
    use uuid::Uuid;

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "user-token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user_id: Uuid::new_v4(),
            email: "bruno@example.com".to_string(),
        }
    }

    fn store() -> RestStore {
        RestStore::new("https://project.example.com", "anon").unwrap()
    }

    fn header<'a>(req: &'a reqwest::Request, name: &str) -> &'a str {
        req.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn in_filter_lists_ids() {
        assert_eq!(in_filter(&[EntryId(3), EntryId(10)]), "in.(3,10)");
    }

    #[test]
    fn base_url_with_path_keeps_its_prefix() {
        let store = RestStore::new("https://host.example.com/proxy", "anon").unwrap();
        let req = store
            .fetch_request(&session(), Owner::Bruno)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.url().path(), "/proxy/rest/v1/despesas");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        assert!(matches!(
            RestStore::new("not a url", "anon"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn fetch_filters_by_owner_and_orders_newest_first() {
        let req = store()
            .fetch_request(&session(), Owner::Fernanda)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.url().path(), "/rest/v1/despesas");

        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("pessoa".into(), "eq.FERNANDA".into())));
        assert!(pairs.contains(&("order".into(), "data.desc,id.desc".into())));
        assert_eq!(header(&req, "apikey"), "anon");
        assert_eq!(header(&req, "authorization"), "Bearer user-token");
    }

    #[test]
    fn settle_is_one_patch_over_all_ids() {
        let req = store()
            .with_table("ledger")
            .settle_request(&session(), &[EntryId(1), EntryId(2)])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::PATCH);
        assert_eq!(req.url().path(), "/rest/v1/ledger");

        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert!(pairs.contains(&("id".into(), "in.(1,2)".into())));
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"status":true}"#);
    }

    #[test]
    fn insert_sends_the_whole_batch_as_one_array() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let drafts = vec![
            EntryDraft::new(Owner::Bruno, Kind::Expense, "a", MoneyCents::new(100), date),
            EntryDraft::new(Owner::Bruno, Kind::Expense, "b", MoneyCents::new(200), date),
        ];
        let req = store()
            .insert_request(&session(), &drafts)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(header(&req, "prefer"), "return=representation");

        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[1]["competência"], "2024/01");
    }

    #[test]
    fn delete_targets_one_id() {
        let req = store()
            .delete_request(&session(), EntryId(42))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::DELETE);
        assert_eq!(req.url().query(), Some("id=eq.42"));
    }

    #[test]
    fn password_grant_uses_the_token_endpoint() {
        let identity = RestIdentity::new("https://project.example.com/", "anon").unwrap();
        let req = identity
            .token_request("password")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.url().path(), "/auth/v1/token");
        assert_eq!(req.url().query(), Some("grant_type=password"));
        assert_eq!(header(&req, "apikey"), "anon");
    }
}
