//! Order status shown on the confirmation page.

use serde::{Deserialize, Serialize};

/// Fulfillment status of a mocked order.
///
/// Serialized with the human-readable labels the order page displays, so a
/// stored order reads `"status": "Preparing shipment"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Set on every freshly submitted order.
    #[default]
    #[serde(rename = "Preparing shipment")]
    PreparingShipment,
    /// Fallback label when a stored order carries no status.
    #[serde(rename = "In progress")]
    InProgress,
}

impl OrderStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PreparingShipment => "Preparing shipment",
            Self::InProgress => "In progress",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_preparing_shipment() {
        assert_eq!(OrderStatus::default(), OrderStatus::PreparingShipment);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&OrderStatus::PreparingShipment).unwrap();
        assert_eq!(json, "\"Preparing shipment\"");

        let parsed: OrderStatus = serde_json::from_str("\"In progress\"").unwrap();
        assert_eq!(parsed, OrderStatus::InProgress);
    }

    #[test]
    fn test_display_matches_serialized_label() {
        for status in [OrderStatus::PreparingShipment, OrderStatus::InProgress] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
