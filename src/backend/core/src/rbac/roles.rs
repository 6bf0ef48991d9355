//! Account roles.
//!
//! Every credential carries exactly one role, and every role maps to its own
//! account collection. Sellers and deliverers additionally go through the
//! approval workflow before their role-gated routes open up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Seller,
    Deliverer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Customer, Role::Seller, Role::Deliverer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Deliverer => "deliverer",
        }
    }

    /// Whether accounts with this role must be approved by an admin before
    /// their role-gated routes become usable.
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::Seller | Self::Deliverer)
    }

    /// Account kind as it appears in user-facing messages, e.g. "Seller".
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Customer => "Customer",
            Self::Seller => "Seller",
            Self::Deliverer => "Deliverer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "deliverer" => Ok(Self::Deliverer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A role string that is not one of the four known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("superuser".to_string()));
    }

    #[test]
    fn test_approval_requirement() {
        assert!(Role::Seller.requires_approval());
        assert!(Role::Deliverer.requires_approval());
        assert!(!Role::Admin.requires_approval());
        assert!(!Role::Customer.requires_approval());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Deliverer).unwrap(), "\"deliverer\"");
        let role: Role = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, Role::Seller);
    }
}
