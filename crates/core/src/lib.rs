//! ReFit Core - Shared domain types and pricing logic.
//!
//! This crate provides the common domain used across all ReFit components:
//! - `storefront` - Public trade-in API (quotes, wizard, inbound shipping)
//! - `admin` - Internal back office (invoicing, outbound shipping)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The pricing catalog is embedded static data, the
//! quote calculator is a deterministic function over it, and the trade-in
//! wizard is an in-memory state machine. This keeps the crate usable from
//! any context, including tests that never touch the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, and status enums
//! - [`catalog`] - The device pricing table and model index
//! - [`quote`] - The trade-in quote calculator
//! - [`wizard`] - The four-step trade-in wizard state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod quote;
pub mod types;
pub mod wizard;

pub use types::*;
