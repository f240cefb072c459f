// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Permission, Role};

/// Claims carried in the token payload.
///
/// `sub` and `email` are required; a payload without them is rejected
/// before this type is constructed. `role` defaults to [`Role::User`]
/// when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: i64,
    /// User email
    pub email: String,
    /// User role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued at (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Authenticated user information reconstructed from a verified token.
///
/// This is the identity every authorization decision is made against. It
/// is rebuilt on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// User ID (token `sub` claim)
    pub user_id: i64,
    /// User email
    pub email: String,
    /// User role
    pub role: Role,
    /// Explicit grants on top of the role defaults
    #[serde(default)]
    pub custom_permissions: BTreeSet<Permission>,
}

impl AuthenticatedUser {
    pub fn new(user_id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            custom_permissions: BTreeSet::new(),
        }
    }

    /// Create from verified claims.
    ///
    /// Tokens do not carry custom grants, so the result has none.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self::new(claims.sub, claims.email, claims.role.unwrap_or_default())
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.custom_permissions.extend(permissions);
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
