// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Job function of an authenticated FuelSync user.
///
/// ## Role Hierarchy
///
/// - `SuperAdmin` - Platform administrator, full access on every tier
/// - `Owner` - Tenant owner, widest access within the tenant's plan
/// - `Manager` - Station manager, operational access
/// - `Attendant` - Forecourt attendant, readings and cash entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator
    SuperAdmin,
    /// Tenant owner
    Owner,
    /// Station manager
    Manager,
    /// Forecourt attendant
    Attendant,
}

impl UserRole {
    /// All roles, most privileged first.
    pub const ALL: [UserRole; 4] = [
        UserRole::SuperAdmin,
        UserRole::Owner,
        UserRole::Manager,
        UserRole::Attendant,
    ];

    /// Parse role from string (case-insensitive).
    /// Used when extracting roles from session token claims.
    pub fn from_str(s: &str) -> Option<UserRole> {
        match s.to_lowercase().as_str() {
            "superadmin" => Some(UserRole::SuperAdmin),
            "owner" => Some(UserRole::Owner),
            "manager" => Some(UserRole::Manager),
            "attendant" => Some(UserRole::Attendant),
            _ => None,
        }
    }

    /// Whether this role is the platform administrator.
    pub fn is_superadmin(&self) -> bool {
        *self == UserRole::SuperAdmin
    }
}

impl Default for UserRole {
    /// Default role is Attendant (least privilege for authenticated users).
    fn default() -> Self {
        UserRole::Attendant
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "superadmin"),
            UserRole::Owner => write!(f, "owner"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Attendant => write!(f, "attendant"),
        }
    }
}
