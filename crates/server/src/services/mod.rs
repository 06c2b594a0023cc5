//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `credits` - Credit balance lookup
//! - `payment` - Plan purchases and settlement
//! - `razorpay` - Razorpay gateway client
//! - `token` - Session token signing

pub mod auth;
pub mod credits;
pub mod payment;
pub mod razorpay;
pub mod token;
