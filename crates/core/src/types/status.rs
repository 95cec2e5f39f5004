//! Status and choice enums for orders, payments and saved addresses.
//!
//! Each enum is stored as plain text in `PostgreSQL`. The `as_str` value is the
//! database spelling and `FromStr` accepts exactly that spelling, so a row
//! holding anything else is reported as corrupt rather than silently mapped.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted value is not a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownVariant {
                kind: "order status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Payment record status.
///
/// Payments are recorded as `Pending` at checkout; nothing in the storefront
/// settles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(UnknownVariant {
                kind: "payment status",
                value: s.to_owned(),
            }),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// bKash mobile wallet.
    Bkash,
    /// Debit or credit card.
    Card,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Bkash => "bkash",
            Self::Card => "card",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "bkash" => Ok(Self::Bkash),
            "card" => Ok(Self::Card),
            _ => Err(UnknownVariant {
                kind: "payment method",
                value: s.to_owned(),
            }),
        }
    }
}

/// Label a person saves an address under. One address per label per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddressLabel {
    #[default]
    Home,
    Office,
    Friend,
    Other,
}

impl AddressLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Office => "Office",
            Self::Friend => "Friend",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for AddressLabel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Home" => Ok(Self::Home),
            "Office" => Ok(Self::Office),
            "Friend" => Ok(Self::Friend),
            "Other" => Ok(Self::Other),
            _ => Err(UnknownVariant {
                kind: "address label",
                value: s.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_matches_database_spelling() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"out_for_delivery\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Bkash).unwrap(),
            "\"bkash\""
        );
        assert_eq!(
            serde_json::to_string(&AddressLabel::Office).unwrap(),
            "\"Office\""
        );
    }

    #[test]
    fn test_payment_method_rejects_unknown() {
        let err = "nagad".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.kind, "payment method");
        assert_eq!(err.to_string(), "invalid payment method: nagad");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
        assert_eq!(AddressLabel::default(), AddressLabel::Home);
    }

    #[test]
    fn test_address_label_is_case_sensitive() {
        assert!("home".parse::<AddressLabel>().is_err());
        assert_eq!(
            "Friend".parse::<AddressLabel>().unwrap(),
            AddressLabel::Friend
        );
    }
}
