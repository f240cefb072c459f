// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.
//!
//! Exchanges email and password for a 24-hour bearer token. There is no
//! registration, refresh or logout endpoint.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{ApiResponse, LoginRequest, LoginResponse, UserProfile},
    state::AppState,
    storage::{repository::burn_password_check, UserRepository},
};

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = {
        let storage = state.storage.read().await;
        UserRepository::new(&storage).find_by_email(request.email.trim())?
    };

    // An unknown email still pays for one bcrypt verification.
    let verified = match user {
        Some(user) => user.verify_password(&request.password).then_some(user),
        None => {
            burn_password_check(&request.password);
            None
        }
    };
    let Some(user) = verified else {
        tracing::warn!("Login rejected: invalid credentials");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    let issued = state.guard.tokens().issue(user.id, &user.email, user.role)?;
    tracing::info!(user_id = user.id, role = %user.role, "Token issued");

    let response = LoginResponse {
        user: UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
        token: issued.token,
        expires_at: issued.claims.exp.unwrap_or_default(),
    };

    Ok(Json(ApiResponse::new(response, "Login successful")))
}
