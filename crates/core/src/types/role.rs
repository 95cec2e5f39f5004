//! Person roles.
//!
//! Every person row carries exactly one role, and a matching row exists in
//! that role's subtype table.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// The role a person signed up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A shopper who places orders.
    #[default]
    User,
    /// Store staff.
    Admin,
    /// A merchant who lists products.
    Seller,
    /// A delivery rider.
    Rider,
}

impl Role {
    /// All roles, in the order they appear in the `person.role` check constraint.
    pub const ALL: [Self; 4] = [Self::User, Self::Admin, Self::Seller, Self::Rider];

    /// The string stored in the database and exchanged over the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Seller => "seller",
            Self::Rider => "rider",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "rider" => Ok(Self::Rider),
            _ => Err(RoleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_roles() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_rejects_unknown_and_case_variants() {
        assert!("customer".parse::<Role>().is_err());
        assert!("Seller".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Rider).unwrap(), "\"rider\"");
        let role: Role = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, Role::Seller);
    }
}
