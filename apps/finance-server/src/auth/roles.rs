// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// Every identity carries exactly one role. The default permission set of
/// each role lives in [`PermissionCatalog`](super::PermissionCatalog).
///
/// - `Admin` - Unconditional access to every transaction and summary
/// - `User` - Manages their own transactions
/// - `Viewer` - Read-only access to their own transactions
/// - `Guest` - No default permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal user (owns transactions)
    User,
    /// Read-only access to own data
    Viewer,
    /// Authenticated but without default grants
    Guest,
}

impl Role {
    /// All roles, in descending order of privilege.
    pub const ALL: [Role; 4] = [Role::Admin, Role::User, Role::Viewer, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
        }
    }
}

impl Default for Role {
    /// Tokens without a `role` claim are treated as plain users.
    fn default() -> Self {
        Role::User
    }
}

/// Error returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "viewer" => Ok(Role::Viewer),
            "guest" => Ok(Role::Guest),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
