//! Session-related types.

use serde::{Deserialize, Serialize};

use chaldal_core::{Email, PersonId, Role};

use super::AuthenticatedPerson;

/// Session-stored identity of the logged-in person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "user_id")]
    pub id: PersonId,
    #[serde(rename = "full_name")]
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<&AuthenticatedPerson> for CurrentUser {
    fn from(person: &AuthenticatedPerson) -> Self {
        Self {
            id: person.id,
            name: person.name.clone(),
            email: person.email.clone(),
            role: person.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in person.
    pub const CURRENT_USER: &str = "current_user";
}
