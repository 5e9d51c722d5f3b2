use std::sync::Arc;

use engine::{Entry, EntryDraft, EntryId, Owner};

use crate::{error::Result, session::Session};

/// Remote persistence of entries, partitioned by owner.
///
/// Every call carries the caller's session; implementations must not be used
/// without one.
pub trait RecordStore: Send + Sync {
    /// All entries of `owner`, newest first (`date` descending, then `id`
    /// descending).
    fn fetch(
        &self,
        session: &Session,
        owner: Owner,
    ) -> impl Future<Output = Result<Vec<Entry>>> + Send;

    /// Inserts `drafts` in a single request. Either every row is created or
    /// none is.
    fn insert(
        &self,
        session: &Session,
        drafts: &[EntryDraft],
    ) -> impl Future<Output = Result<Vec<Entry>>> + Send;

    /// Replaces every field of entry `id`.
    fn update(
        &self,
        session: &Session,
        id: EntryId,
        draft: &EntryDraft,
    ) -> impl Future<Output = Result<Entry>> + Send;

    /// Marks `ids` as settled in a single request and returns how many rows
    /// changed.
    fn settle(
        &self,
        session: &Session,
        ids: &[EntryId],
    ) -> impl Future<Output = Result<usize>> + Send;

    fn delete(&self, session: &Session, id: EntryId) -> impl Future<Output = Result<()>> + Send;
}

impl<S: RecordStore> RecordStore for Arc<S> {
    fn fetch(
        &self,
        session: &Session,
        owner: Owner,
    ) -> impl Future<Output = Result<Vec<Entry>>> + Send {
        (**self).fetch(session, owner)
    }

    fn insert(
        &self,
        session: &Session,
        drafts: &[EntryDraft],
    ) -> impl Future<Output = Result<Vec<Entry>>> + Send {
        (**self).insert(session, drafts)
    }

    fn update(
        &self,
        session: &Session,
        id: EntryId,
        draft: &EntryDraft,
    ) -> impl Future<Output = Result<Entry>> + Send {
        (**self).update(session, id, draft)
    }

    fn settle(
        &self,
        session: &Session,
        ids: &[EntryId],
    ) -> impl Future<Output = Result<usize>> + Send {
        (**self).settle(session, ids)
    }

    fn delete(&self, session: &Session, id: EntryId) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(session, id)
    }
}
