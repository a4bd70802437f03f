//! Shared wire types and signing algorithms for the report portal API.
//!
//! - [`objects`] holds the request/response bodies exchanged with the server
//!   together with their boundary validation.
//! - [`signature`] implements the payment gateway callback signature check.
//! - [`token`] issues and verifies the signed, time-limited tokens handed out
//!   for orders, report access and login sessions.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod objects;
pub mod signature;
pub mod token;
