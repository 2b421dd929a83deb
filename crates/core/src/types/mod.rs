//! Core types for GearUp.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::ProductRecord;
pub use quantity::{IntoQuantity, Quantity};
pub use status::OrderStatus;
