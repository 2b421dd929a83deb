//! Line item quantity with a floor of one.
//!
//! Quantities arrive from many places: a number input, a `+`/`-` button
//! delta, or a stored JSON value written by an older page. [`Quantity::sanitize`]
//! and its siblings coerce any of these into a valid quantity, so the
//! minimum-quantity rule cannot be broken through the public API.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A whole number of units, always at least [`Quantity::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Smallest quantity that may be stored in a cart.
    pub const MIN: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Coerce an arbitrary JSON value into a quantity.
    ///
    /// Numbers and numeric strings are floored; anything non-numeric or
    /// below one clamps to one.
    ///
    /// ```
    /// use gearup_core::Quantity;
    /// use serde_json::json;
    ///
    /// assert_eq!(Quantity::sanitize(&json!(0)).get(), 1);
    /// assert_eq!(Quantity::sanitize(&json!(-5)).get(), 1);
    /// assert_eq!(Quantity::sanitize(&json!("abc")).get(), 1);
    /// assert_eq!(Quantity::sanitize(&json!(3.7)).get(), 3);
    /// ```
    #[must_use]
    pub fn sanitize(raw: &Value) -> Self {
        match raw {
            Value::Number(number) => number.as_f64().map_or(Self::MIN, Self::sanitize_f64),
            Value::String(text) => Self::sanitize_str(text),
            _ => Self::MIN,
        }
    }

    /// Coerce text (e.g. a form input) into a quantity.
    ///
    /// Surrounding whitespace is ignored and empty input counts as zero.
    #[must_use]
    pub fn sanitize_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::MIN;
        }
        trimmed
            .parse::<f64>()
            .map_or(Self::MIN, Self::sanitize_f64)
    }

    /// Coerce a float into a quantity, flooring fractional values.
    #[must_use]
    pub fn sanitize_f64(raw: f64) -> Self {
        if raw.is_nan() || raw < f64::from(Self::MIN.get()) {
            return Self::MIN;
        }
        // Float to int casts saturate, so +inf lands on u32::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let floored = raw.floor() as u32;
        Self::new(floored).unwrap_or(Self::MIN)
    }

    /// Coerce a signed integer into a quantity.
    #[must_use]
    pub fn sanitize_i64(raw: i64) -> Self {
        u32::try_from(raw.max(1))
            .ok()
            .and_then(Self::new)
            .unwrap_or(Self(NonZeroU32::MAX))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

/// Conversion of caller-supplied input into a sanitized [`Quantity`].
///
/// Cart operations accept `impl IntoQuantity`, so whatever a caller passes
/// (a form string, a JSON value, a float) goes through the same floor.
pub trait IntoQuantity {
    /// Sanitize `self` into a quantity.
    fn into_quantity(self) -> Quantity;
}

impl IntoQuantity for Quantity {
    fn into_quantity(self) -> Quantity {
        self
    }
}

impl IntoQuantity for u32 {
    fn into_quantity(self) -> Quantity {
        Quantity::new(self).unwrap_or(Quantity::MIN)
    }
}

impl IntoQuantity for i64 {
    fn into_quantity(self) -> Quantity {
        Quantity::sanitize_i64(self)
    }
}

impl IntoQuantity for f64 {
    fn into_quantity(self) -> Quantity {
        Quantity::sanitize_f64(self)
    }
}

impl IntoQuantity for &str {
    fn into_quantity(self) -> Quantity {
        Quantity::sanitize_str(self)
    }
}

impl IntoQuantity for &Value {
    fn into_quantity(self) -> Quantity {
        Quantity::sanitize(self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sanitize_clamps_to_floor() {
        assert_eq!(Quantity::sanitize(&json!(0)), Quantity::MIN);
        assert_eq!(Quantity::sanitize(&json!(-5)), Quantity::MIN);
        assert_eq!(Quantity::sanitize(&json!(0.5)), Quantity::MIN);
    }

    #[test]
    fn test_sanitize_non_numeric() {
        assert_eq!(Quantity::sanitize(&json!("abc")), Quantity::MIN);
        assert_eq!(Quantity::sanitize(&json!(null)), Quantity::MIN);
        assert_eq!(Quantity::sanitize(&json!([2])), Quantity::MIN);
        assert_eq!(Quantity::sanitize_str(""), Quantity::MIN);
        assert_eq!(Quantity::sanitize_f64(f64::NAN), Quantity::MIN);
    }

    #[test]
    fn test_sanitize_floors() {
        assert_eq!(Quantity::sanitize(&json!(3.7)).get(), 3);
        assert_eq!(Quantity::sanitize(&json!("4.2")).get(), 4);
        assert_eq!(Quantity::sanitize_str(" 12 ").get(), 12);
    }

    #[test]
    fn test_sanitize_huge_values_saturate() {
        assert_eq!(Quantity::sanitize_f64(f64::INFINITY).get(), u32::MAX);
        assert_eq!(Quantity::sanitize_i64(i64::MAX).get(), u32::MAX);
        assert_eq!(Quantity::sanitize_i64(-3), Quantity::MIN);
        assert_eq!(Quantity::sanitize_i64(7).get(), 7);
    }

    #[test]
    fn test_into_quantity_for_inputs() {
        assert_eq!(0_u32.into_quantity(), Quantity::MIN);
        assert_eq!(5_u32.into_quantity().get(), 5);
        assert_eq!((-2_i64).into_quantity(), Quantity::MIN);
        assert_eq!(2.9_f64.into_quantity().get(), 2);
        assert_eq!("6".into_quantity().get(), 6);
        assert_eq!((&json!("x")).into_quantity(), Quantity::MIN);
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(Quantity::new(0).is_none());
        assert_eq!(Quantity::new(2).unwrap().get(), 2);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
    }
}
