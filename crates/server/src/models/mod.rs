//! Domain models for the API server.
//!
//! Row types live next to their queries in [`crate::db`]; these are the
//! validated shapes the services work with.

pub mod transaction;
pub mod user;

pub use transaction::{NewTransaction, Transaction};
pub use user::{NewUser, PublicProfile, User};
