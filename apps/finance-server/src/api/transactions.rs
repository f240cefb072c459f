// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction API endpoints.
//!
//! Every handler runs the same two-step check:
//!
//! 1. The guard verifies the bearer token and a coarse permission
//!    (the `own` variant of the action, which every role able to act at
//!    all holds).
//! 2. After the record is fetched (404 first), the engine decides on the
//!    record's owner.
//!
//! Listing never fails on ownership; records the caller may not view are
//! filtered out.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{NaiveDate, Utc};

use crate::{
    auth::{Action, Permission},
    error::ApiError,
    models::{ApiResponse, CreateTransactionRequest, MessageResponse, UpdateTransactionRequest},
    state::AppState,
    storage::{StoredTransaction, TransactionRepository},
};

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 100;
const AMOUNT_MAX: f64 = 999_999_999.0;
const DESCRIPTION_MAX_CHARS: usize = 500;

/// List the transactions visible to the caller, newest first.
///
/// Admins and holders of `transactions:view:all` see everything; everyone
/// else sees their own records.
#[utoipa::path(
    get,
    path = "/v1/transactions",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible transactions", body = ApiResponse<Vec<StoredTransaction>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<StoredTransaction>>>, ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::TransactionsViewOwn))?;

    let storage = state.storage.read().await;
    let visible: Vec<StoredTransaction> = TransactionRepository::new(&storage)
        .list_all()?
        .into_iter()
        .filter(|tx| state.engine().can_view(&user, tx.user_id))
        .collect();

    Ok(Json(ApiResponse::new(
        visible,
        "Transactions retrieved successfully",
    )))
}

/// Create a transaction owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/transactions",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = ApiResponse<StoredTransaction>),
        (status = 400, description = "Invalid transaction"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoredTransaction>>), ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::TransactionsCreate))?;

    request.title = validate_title(&request.title)?;
    validate_amount(request.amount)?;
    validate_date(request.date, Utc::now().date_naive())?;
    validate_description(request.description.as_deref())?;

    let transaction = StoredTransaction::new(user.user_id, request);
    {
        let storage = state.storage.write().await;
        TransactionRepository::new(&storage).create(&transaction)?;
    }

    tracing::info!(
        user_id = user.user_id,
        transaction_id = %transaction.id,
        "Transaction created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(transaction, "Transaction created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/transactions/{transaction_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(
        ("transaction_id" = String, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction details", body = ApiResponse<StoredTransaction>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your transaction"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<StoredTransaction>>, ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::TransactionsViewOwn))?;

    let storage = state.storage.read().await;
    let transaction = TransactionRepository::new(&storage)
        .get(&transaction_id)?
        .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

    state
        .engine()
        .authorize(&user, Action::View, &transaction)
        .map_err(|_| ApiError::forbidden("You do not have permission to view this transaction"))?;

    Ok(Json(ApiResponse::new(
        transaction,
        "Transaction retrieved successfully",
    )))
}

/// Partially update a transaction. The owner never changes.
#[utoipa::path(
    put,
    path = "/v1/transactions/{transaction_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(
        ("transaction_id" = String, Path, description = "Transaction ID")
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = ApiResponse<StoredTransaction>),
        (status = 400, description = "Invalid transaction"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your transaction"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
    Json(mut request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<StoredTransaction>>, ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::TransactionsEditOwn))?;

    let storage = state.storage.write().await;
    let repo = TransactionRepository::new(&storage);
    let mut transaction = repo
        .get(&transaction_id)?
        .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

    state
        .engine()
        .authorize(&user, Action::Edit, &transaction)
        .map_err(|_| ApiError::forbidden("You do not have permission to edit this transaction"))?;

    if let Some(title) = request.title.as_deref() {
        request.title = Some(validate_title(title)?);
    }
    if let Some(amount) = request.amount {
        validate_amount(amount)?;
    }
    if let Some(date) = request.date {
        validate_date(date, Utc::now().date_naive())?;
    }
    validate_description(request.description.as_deref())?;

    transaction.apply(request);
    repo.update(&transaction)?;

    tracing::info!(
        user_id = user.user_id,
        transaction_id = %transaction.id,
        "Transaction updated"
    );

    Ok(Json(ApiResponse::new(
        transaction,
        "Transaction updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/v1/transactions/{transaction_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(
        ("transaction_id" = String, Path, description = "Transaction ID to delete")
    ),
    responses(
        (status = 200, description = "Transaction deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your transaction"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transaction_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::TransactionsDeleteOwn))?;

    let storage = state.storage.write().await;
    let repo = TransactionRepository::new(&storage);
    let transaction = repo
        .get(&transaction_id)?
        .ok_or_else(|| ApiError::not_found("Transaction not found"))?;

    state
        .engine()
        .authorize(&user, Action::Delete, &transaction)
        .map_err(|_| {
            ApiError::forbidden("You do not have permission to delete this transaction")
        })?;

    repo.delete(&transaction.id)?;

    tracing::info!(
        user_id = user.user_id,
        transaction_id = %transaction.id,
        "Transaction deleted"
    );

    Ok(Json(MessageResponse {
        message: "Transaction deleted successfully".to_string(),
    }))
}

/// Trimmed title of 3 to 100 characters.
fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS {
        return Err(ApiError::bad_request(
            "Title must be at least 3 characters",
        ));
    }
    if chars > TITLE_MAX_CHARS {
        return Err(ApiError::bad_request(
            "Title must not exceed 100 characters",
        ));
    }
    Ok(title.to_string())
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if amount.is_nan() || amount <= 0.0 {
        return Err(ApiError::bad_request("Amount must be greater than 0"));
    }
    if amount > AMOUNT_MAX {
        return Err(ApiError::bad_request("Amount is too large"));
    }
    Ok(())
}

fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<(), ApiError> {
    if date > today {
        return Err(ApiError::bad_request("Date cannot be in the future"));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ApiError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_CHARS => Err(ApiError::bad_request(
            "Description must not exceed 500 characters",
        )),
        _ => Ok(()),
    }
}
