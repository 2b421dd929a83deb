//! Client-side shopping cart.
//!
//! # Architecture
//!
//! - [`CartStore`] is the only component that reads or writes the persisted
//!   cart. Views go through its operations and its `cart:updated` signal.
//! - Stored data is normalized on every read: entries are merged by product
//!   id ([`aggregate`]) and anything malformed reads as an empty cart.
//! - Totals are derived, never stored ([`compute_totals`]).

mod aggregate;
mod events;
mod line_item;
mod store;
mod view;

pub use aggregate::{CartState, CartTotals, aggregate, compute_totals, parse_entries};
pub use events::{CART_UPDATED_EVENT, CartEvents, CartUpdated, ChangeOrigin};
pub use line_item::{DisplayFields, LineItem, StoredEntry};
pub use store::CartStore;
pub use view::{CartItemView, CartView};
