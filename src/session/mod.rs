//! Session scoping.
//!
//! The active user id is the only process-wide mutable state. It lives in
//! the durable key-value store, is written by the login/logout flow on
//! the factory, and is read into an immutable [`SessionContext`] that
//! every per-user repository, service, and engine is constructed against.

pub mod factory;
pub mod session_store;

pub use factory::{ServiceFactory, SessionContext, SessionServices};
pub use session_store::{DbSessionStore, SessionStore};
