// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and role-based authorization for the
//! Finance Tracker API.
//!
//! ## Auth Flow
//!
//! 1. `POST /v1/auth/login` checks credentials and issues an HS256 token
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. The server:
//!    - Verifies the HMAC-SHA256 signature and expiry
//!    - Rebuilds the identity from the `sub`, `email`, `role` claims
//!    - Optionally gates on a coarse permission (403 if missing)
//! 4. Handlers fetch the record and ask the engine for an
//!    ownership-aware verdict
//!
//! ## Security
//!
//! - One shared secret signs and verifies; rotating it logs everyone out
//! - Signatures are compared in constant time
//! - Tokens expire 24 hours after issuance and cannot be revoked
//! - Every authentication failure is the same 401 to the client

pub mod claims;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod permissions;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use engine::{Action, AuthorizationEngine, OwnedResource};
pub use error::{AuthError, TokenError, UnauthenticatedCause};
pub use extractor::Auth;
pub use guard::AuthGuard;
pub use permissions::{Permission, PermissionCatalog};
pub use roles::Role;
pub use token::{IssuedToken, SigningSecret, TokenService, TOKEN_TTL_SECS};
