// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Permission, Role},
    models::{
        CreateTransactionRequest, CurrentUserResponse, LoginRequest, LoginResponse,
        MessageResponse, Summary, TransactionCategory, TransactionType, UpdateTransactionRequest,
        UserProfile,
    },
    state::AppState,
    storage::StoredTransaction,
};

pub mod auth;
pub mod health;
pub mod summary;
pub mod transactions;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/{transaction_id}",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route("/summary", get(summary::get_summary))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Outermost last: an `x-request-id` is assigned before tracing and
        // echoed on the response.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        users::get_current_user,
        transactions::list_transactions,
        transactions::create_transaction,
        transactions::get_transaction,
        transactions::update_transaction,
        transactions::delete_transaction,
        summary::get_summary,
        health::health
    ),
    components(
        schemas(
            MessageResponse,
            LoginRequest,
            LoginResponse,
            UserProfile,
            CurrentUserResponse,
            Role,
            Permission,
            StoredTransaction,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            TransactionType,
            TransactionCategory,
            Summary,
            health::HealthResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token issuance"),
        (name = "Users", description = "Current user profile"),
        (name = "Transactions", description = "Income and expense records"),
        (name = "Summary", description = "Totals over visible transactions"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
