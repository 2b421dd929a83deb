//! GearUp storefront library.
//!
//! The cart store, static product catalog and mocked checkout behind the
//! GearUp outdoor gear demo, exposed as a library so the CLI and tests can
//! share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod format;
pub mod state;
pub mod storage;
