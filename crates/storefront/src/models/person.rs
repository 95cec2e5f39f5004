//! Person domain types.

use serde::Serialize;

use chaldal_core::address::AddressText;
use chaldal_core::{AddressId, AddressLabel, Email, PersonId, Phone, Role};

/// A person row without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub role: Role,
}

/// The profile returned after signup or login.
///
/// Serialized with the field names the storefront frontend stores in its
/// session (`user_id`, `full_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedPerson {
    #[serde(rename = "user_id")]
    pub id: PersonId,
    #[serde(rename = "full_name")]
    pub name: String,
    pub email: Email,
    pub role: Role,
    /// Street line of the default address, if any.
    pub address: Option<String>,
    pub address_id: Option<AddressId>,
}

/// Address captured at signup.
#[derive(Debug, Clone)]
pub struct PersonAddressInput {
    pub text: AddressText,
    pub label: AddressLabel,
}

/// Validated input for creating a person of any role.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub role: Role,
    pub password_hash: String,
    pub address: Option<PersonAddressInput>,
}
