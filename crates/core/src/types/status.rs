//! Role and status enums.

use serde::{Deserialize, Serialize};

/// Application role, set once at registration.
///
/// Gates every admin-only mutation; there is no way to change a profile's
/// role after the fact short of operator intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registers and views their own businesses.
    ShopOwner,
    /// Tax officer: full visibility, tax-status mutation, user management.
    Admin,
}

impl Role {
    /// Landing route for a freshly resolved session of this role.
    #[must_use]
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::ShopOwner => "/dashboard",
            Self::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShopOwner => write!(f, "shop_owner"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop_owner" => Ok(Self::ShopOwner),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Tax compliance status of a business.
///
/// Transitions only between these two values, recorded with a fresh
/// `updated_at`, and only by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxStatus {
    Paid,
    #[default]
    Unpaid,
}

impl TaxStatus {
    /// Human-readable label used in badges and marker popups.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
        }
    }
}

impl std::fmt::Display for TaxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Unpaid => write!(f, "unpaid"),
        }
    }
}

impl std::str::FromStr for TaxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(format!("invalid tax status: {s}")),
        }
    }
}

/// Profile lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    #[default]
    Active,
    Suspended,
}
