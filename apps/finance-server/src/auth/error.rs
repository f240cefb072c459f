// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure while verifying a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not three non-empty base64url segments, undecodable JSON, or a bad header
    #[error("token is malformed")]
    MalformedToken,
    /// HMAC over `header.payload` does not match the signature segment
    #[error("token signature is invalid")]
    InvalidSignature,
    /// `sub` or `email` is absent from the payload
    #[error("token is missing required claims")]
    MissingClaims,
    /// `exp` is in the past
    #[error("token has expired")]
    ExpiredToken,
}

/// Why a request was not authenticated.
///
/// Only logged; every cause produces the same 401 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedCause {
    /// No `Authorization: Bearer <token>` header, or an empty token
    MissingToken,
    /// Malformed, tampered, or incomplete token
    InvalidToken(TokenError),
    /// Token expired
    TokenExpired,
}

impl std::fmt::Display for UnauthenticatedCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnauthenticatedCause::MissingToken => write!(f, "missing token"),
            UnauthenticatedCause::InvalidToken(e) => write!(f, "invalid token ({e})"),
            UnauthenticatedCause::TokenExpired => write!(f, "token expired"),
        }
    }
}

/// Authentication and authorization error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedCause),
    /// Authenticated but lacking the permission or ownership required
    #[error("insufficient permissions for this operation")]
    Forbidden,
    /// The signing secret is empty or absent
    #[error("signing secret is empty or absent")]
    MisconfiguredSecret,
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::ExpiredToken => AuthError::Unauthenticated(UnauthenticatedCause::TokenExpired),
            other => AuthError::Unauthenticated(UnauthenticatedCause::InvalidToken(other)),
        }
    }
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
}

impl AuthError {
    /// Internal cause of an authentication failure, for logging.
    pub fn cause(&self) -> Option<UnauthenticatedCause> {
        match self {
            AuthError::Unauthenticated(cause) => Some(*cause),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::MisconfiguredSecret => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Identical for every unauthenticated cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated(_) => "Unauthorized",
            AuthError::Forbidden => "Insufficient permissions",
            AuthError::MisconfiguredSecret => "Internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            message: self.public_message(),
        });
        (self.status_code(), body).into_response()
    }
}
