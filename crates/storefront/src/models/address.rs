//! Delivery areas and saved addresses.

use rust_decimal::Decimal;
use serde::Serialize;

use chaldal_core::{AddressId, AddressLabel, AreaId};

/// A delivery zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub area_id: AreaId,
    pub name: String,
    pub delivery_fee: Decimal,
}

/// An address just linked to a person, with the area it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedAddress {
    pub address_id: AddressId,
    pub street: String,
    pub area: Area,
    /// The area did not exist and was created for this address.
    pub area_created: bool,
}

/// An address saved under one of a person's labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedAddress {
    pub address_id: AddressId,
    pub label: AddressLabel,
    pub street: String,
    pub city: String,
    pub area: String,
    pub delivery_fee: Decimal,
    pub is_default: bool,
}
