//! Order status taxonomy.
//!
//! Raw status strings stored on an order map deterministically to a
//! user-facing presentation (label, icon kind, color category). The mapping
//! is total: unrecognized or missing values fall back to the pending
//! presentation, so rendering code never branches on unknown input.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Stored as a lowercase string in the database; parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, payment method not yet chosen.
    #[default]
    Pending,
    /// Shopper chose to pay in cash at pickup.
    PendingCash,
    /// Shopper was handed off to the online payment gateway.
    PendingOnline,
    /// Order paid and packed, waiting for collection.
    ReadyForPickup,
    /// Order fulfilled.
    Completed,
    /// Order cancelled.
    Cancelled,
}

/// Icon kind for a status chip. Rendering maps these to actual glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Check,
    Bag,
    Cross,
    CreditCard,
    Clock,
}

/// Color category for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorCategory {
    Success,
    Info,
    Error,
    Warning,
    Default,
}

impl ColorCategory {
    /// CSS class suffix used by templates, e.g. `chip-success`.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Default => "default",
        }
    }
}

/// User-facing presentation of an order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    /// Short label shown on receipts and order history.
    pub label: &'static str,
    /// Icon kind for the status chip.
    pub icon: StatusIcon,
    /// Color category for the status chip.
    pub color: ColorCategory,
}

impl OrderStatus {
    /// Parse a raw status string, case-insensitively.
    ///
    /// Total: unknown tokens, the empty string, and `None` all resolve to
    /// [`OrderStatus::Pending`]. Never fails.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("complete" | "completed") => Self::Completed,
            Some("ready_for_pickup") => Self::ReadyForPickup,
            Some("cancelled") => Self::Cancelled,
            Some("pending_cash") => Self::PendingCash,
            Some("pending_online") => Self::PendingOnline,
            _ => Self::Pending,
        }
    }

    /// The lowercase string stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingCash => "pending_cash",
            Self::PendingOnline => "pending_online",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Resolve the presentation triple for this status.
    #[must_use]
    pub const fn presentation(&self) -> StatusPresentation {
        match self {
            Self::Completed => StatusPresentation {
                label: "Completed",
                icon: StatusIcon::Check,
                color: ColorCategory::Success,
            },
            Self::ReadyForPickup => StatusPresentation {
                label: "Order Ready for Pickup",
                icon: StatusIcon::Bag,
                color: ColorCategory::Info,
            },
            Self::Cancelled => StatusPresentation {
                label: "Order Cancelled",
                icon: StatusIcon::Cross,
                color: ColorCategory::Error,
            },
            Self::PendingCash | Self::PendingOnline => StatusPresentation {
                label: "Order Unpaid",
                icon: StatusIcon::CreditCard,
                color: ColorCategory::Warning,
            },
            Self::Pending => StatusPresentation {
                label: "Order Pending",
                icon: StatusIcon::Clock,
                color: ColorCategory::Default,
            },
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the shopper chose to pay for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Redirect to the hosted payment gateway now.
    Online,
    /// Pay in person when collecting the order.
    Cash,
}

impl PaymentMethod {
    /// The order status an order moves to once this method is chosen.
    #[must_use]
    pub const fn pending_status(&self) -> OrderStatus {
        match self {
            Self::Online => OrderStatus::PendingOnline,
            Self::Cash => OrderStatus::PendingCash,
        }
    }

    /// Form value for the payment method radio group.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Cash => "cash",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "cash" => Ok(Self::Cash),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(OrderStatus::parse(Some("complete")), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::parse(Some("completed")),
            OrderStatus::Completed
        );
        assert_eq!(
            OrderStatus::parse(Some("ready_for_pickup")),
            OrderStatus::ReadyForPickup
        );
        assert_eq!(
            OrderStatus::parse(Some("cancelled")),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::parse(Some("pending_cash")),
            OrderStatus::PendingCash
        );
        assert_eq!(
            OrderStatus::parse(Some("pending_online")),
            OrderStatus::PendingOnline
        );
        assert_eq!(OrderStatus::parse(Some("pending")), OrderStatus::Pending);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse(Some("COMPLETED")), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::parse(Some("Ready_For_Pickup")),
            OrderStatus::ReadyForPickup
        );
        assert_eq!(
            OrderStatus::parse(Some("Pending_Cash")),
            OrderStatus::PendingCash
        );
    }

    #[test]
    fn test_parse_is_total() {
        // Unknown tokens, empty input, and missing values all fall through
        // to the pending presentation instead of failing.
        for raw in [
            Some("shipped"),
            Some(""),
            Some("   "),
            Some("???"),
            Some("pending-online"),
            None,
        ] {
            let status = OrderStatus::parse(raw);
            assert_eq!(status, OrderStatus::Pending, "raw input {raw:?}");
            let presentation = status.presentation();
            assert_eq!(presentation.label, "Order Pending");
            assert_eq!(presentation.color, ColorCategory::Default);
        }
    }

    #[test]
    fn test_presentation_table() {
        assert_eq!(
            OrderStatus::Completed.presentation().label,
            "Completed"
        );
        assert_eq!(
            OrderStatus::Completed.presentation().color,
            ColorCategory::Success
        );
        assert_eq!(
            OrderStatus::ReadyForPickup.presentation().label,
            "Order Ready for Pickup"
        );
        assert_eq!(
            OrderStatus::ReadyForPickup.presentation().color,
            ColorCategory::Info
        );
        assert_eq!(
            OrderStatus::Cancelled.presentation().color,
            ColorCategory::Error
        );
        assert_eq!(
            OrderStatus::PendingCash.presentation().label,
            "Order Unpaid"
        );
        assert_eq!(
            OrderStatus::PendingOnline.presentation().label,
            "Order Unpaid"
        );
        assert_eq!(
            OrderStatus::PendingCash.presentation().color,
            ColorCategory::Warning
        );
    }

    #[test]
    fn test_as_str_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::PendingCash,
            OrderStatus::PendingOnline,
            OrderStatus::ReadyForPickup,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(Some(status.as_str())), status);
        }
    }

    #[test]
    fn test_payment_method_pending_status() {
        assert_eq!(
            PaymentMethod::Online.pending_status(),
            OrderStatus::PendingOnline
        );
        assert_eq!(
            PaymentMethod::Cash.pending_status(),
            OrderStatus::PendingCash
        );
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("online".parse::<PaymentMethod>(), Ok(PaymentMethod::Online));
        assert_eq!("cash".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
