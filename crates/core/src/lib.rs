//! Chaldal Core - Shared domain library.
//!
//! This crate provides the types and rules shared by all storefront components:
//! - `storefront` - JSON API consumed by the shopping and seller frontends
//! - `cli` - Command-line tools for migrations, seeding and accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything here can be unit tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, phone numbers, roles and statuses
//! - [`pricing`] - Cart bill computation (coupons, delivery, VAT)
//! - [`catalog`] - Product listing filters and sort orders
//! - [`address`] - Free-text address parsing and delivery area matching

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod catalog;
pub mod pricing;
pub mod types;

pub use types::*;
