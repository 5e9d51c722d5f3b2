//! Record store access, identity and the owner-scoped dashboard.
//!
//! The [`RecordStore`] and [`IdentityProvider`] traits are the seams to the
//! outside world; [`RestStore`]/[`RestIdentity`] talk HTTP while
//! [`MemoryStore`]/[`MemoryIdentity`] keep everything in process.

pub use dashboard::{Dashboard, FetchTicket};
pub use error::{ClientError, Result};
pub use identity::{Authenticator, IdentityProvider, SignUp};
pub use memory::{MemoryIdentity, MemoryStore};
pub use rest::{DEFAULT_TABLE, RestIdentity, RestStore};
pub use session::{Session, SessionHub, SessionSubscription};
pub use store::RecordStore;

mod dashboard;
mod error;
mod identity;
mod memory;
mod records;
mod rest;
mod session;
mod store;
