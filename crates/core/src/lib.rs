//! GearUp Core - Shared types library.
//!
//! This crate provides common types used across all GearUp components:
//! - `storefront` - Cart store, catalog, checkout and storage
//! - `cli` - Command-line driver for browsing and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, emails, statuses
//!   and the catalog product record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
