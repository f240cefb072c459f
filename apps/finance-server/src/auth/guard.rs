// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-boundary authentication.
//!
//! Per request:
//!
//! ```text
//! Unauthenticated → token present? → Authenticating → valid & unexpired?
//!     → Authenticated → coarse permission? → Authorized | Forbidden
//! ```
//!
//! The guard is stateless. The returned identity is rebuilt from the token
//! every time and carries no custom grants.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::{
    AuthError, AuthenticatedUser, AuthorizationEngine, Permission, TokenService,
    UnauthenticatedCause,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Composes [`TokenService`] and [`AuthorizationEngine`] into one check.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    tokens: TokenService,
    engine: AuthorizationEngine,
}

impl AuthGuard {
    pub fn new(tokens: TokenService, engine: AuthorizationEngine) -> Self {
        Self { tokens, engine }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    /// Authenticate an `Authorization` header value and optionally check a
    /// coarse permission.
    pub fn authenticate(
        &self,
        header: Option<&str>,
        required: Option<Permission>,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.authenticate_at(header, required, chrono::Utc::now().timestamp())
    }

    /// As [`authenticate`](Self::authenticate), with an explicit clock.
    pub fn authenticate_at(
        &self,
        header: Option<&str>,
        required: Option<Permission>,
        now: i64,
    ) -> Result<AuthenticatedUser, AuthError> {
        let result = self.check(header, required, now);
        if let Err(e) = &result {
            match e.cause() {
                Some(cause) => tracing::warn!(%cause, "Request rejected: unauthenticated"),
                None => tracing::info!(
                    permission = required.map(|p| p.as_str()),
                    "Request rejected: {e}"
                ),
            }
        }
        result
    }

    /// Read the `Authorization` header from a header map.
    pub fn authenticate_headers(
        &self,
        headers: &HeaderMap,
        required: Option<Permission>,
    ) -> Result<AuthenticatedUser, AuthError> {
        // Non-ASCII header values count as no token.
        let header = headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default());
        self.authenticate(header, required)
    }

    fn check(
        &self,
        header: Option<&str>,
        required: Option<Permission>,
        now: i64,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated(UnauthenticatedCause::MissingToken))?;

        let claims = self.tokens.verify_at(token, now)?;
        let user = AuthenticatedUser::from_claims(claims);

        if let Some(permission) = required {
            self.engine.require(&user, permission)?;
        }

        Ok(user)
    }
}
