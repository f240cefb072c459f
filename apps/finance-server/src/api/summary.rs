// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    auth::Permission,
    error::ApiError,
    models::{ApiResponse, Summary, TransactionType},
    state::AppState,
    storage::{StoredTransaction, TransactionRepository},
};

/// Income, expense and balance totals over the transactions the caller may
/// summarize.
#[utoipa::path(
    get,
    path = "/v1/summary",
    tag = "Summary",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Totals", body = ApiResponse<Summary>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Summary>>, ApiError> {
    let user = state
        .guard
        .authenticate_headers(&headers, Some(Permission::SummaryViewOwn))?;

    let transactions = {
        let storage = state.storage.read().await;
        TransactionRepository::new(&storage).list_all()?
    };

    let summary = summarize(
        transactions
            .iter()
            .filter(|tx| state.engine().can_view_summary(&user, tx.user_id)),
    );

    Ok(Json(ApiResponse::new(summary, "Summary retrieved successfully")))
}

fn summarize<'a>(transactions: impl Iterator<Item = &'a StoredTransaction>) -> Summary {
    let (total_income, total_expenses) =
        transactions.fold((0.0, 0.0), |(income, expenses), tx| match tx.kind {
            TransactionType::Income => (income + tx.amount, expenses),
            TransactionType::Expense => (income, expenses + tx.amount),
        });

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
    }
}
