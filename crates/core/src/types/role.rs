//! User roles used by access-gated storefront areas.

use serde::{Deserialize, Serialize};

/// Error parsing a [`UserRole`] from its stored name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid user role: {0}")]
pub struct RoleParseError(pub String);

/// Role of an authenticated user.
///
/// Users without an explicit role row are customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including product management.
    Admin,
    /// Product management without store settings.
    Moderator,
    #[default]
    Customer,
}

impl UserRole {
    /// Whether the role may create, edit, or delete catalog products.
    #[must_use]
    pub const fn can_manage_products(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}
