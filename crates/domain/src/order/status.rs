//! Order lifecycle states.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The lifecycle state of a placed order.
///
/// ```text
/// Pending ──► Confirmed ──► Shipped ──► Delivered
///    │            │            │
///    └────────────┴────────────┴──► Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Transitions are not
/// restricted to the forward sequence: any recognized status may
/// overwrite any other. [`OrderStatus::is_terminal`] is the hook for
/// adding adjacency validation if that ever becomes a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Initial state of every newly placed order.
    #[default]
    Pending,

    /// Order acknowledged and queued for fulfillment.
    Confirmed,

    /// Order handed to the carrier.
    Shipped,

    /// Order received by the customer (terminal).
    Delivered,

    /// Order cancelled (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transitions are expected from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(OrderError::InvalidStatus(s.to_string())),
        }
    }
}
