//! `admindeck-auth` — session authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP routing and storage: it
//! consumes a header collection and a [`SessionLookup`] collaborator, and
//! produces an authorization decision. Storage implementations live in
//! `admindeck-infra`.

pub mod guard;
pub mod lookup;
pub mod roles;
pub mod session;

pub use guard::{AuthGuard, GuardCache, GuardError};
pub use lookup::{session_token, SessionLookup, SessionStoreError, SESSION_COOKIE};
pub use roles::Role;
pub use session::{AuthUser, SessionBundle, SessionRecord};
