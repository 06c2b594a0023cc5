//! Imagify Core - Shared types library.
//!
//! This crate provides the domain types used across the Imagify components:
//! - `server` - HTTP API for accounts, credits and payments
//! - `cli` - Command-line tools for migrations and operator lookups
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, plans and money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
