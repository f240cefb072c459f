// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction repository.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/transactions/
//!   {transaction_id}.json
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{FileStorage, StorageError, StorageResult};
use crate::auth::OwnedResource;
use crate::models::{
    CreateTransactionRequest, TransactionCategory, TransactionType, UpdateTransactionRequest,
};

/// Stored transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    /// Transaction identifier (UUID)
    pub id: String,
    /// Owning user
    pub user_id: i64,
    pub title: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: TransactionCategory,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredTransaction {
    /// Build a new record owned by `user_id`.
    pub fn new(user_id: i64, request: CreateTransactionRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: request.title,
            amount: request.amount,
            kind: request.kind,
            category: request.category,
            date: request.date,
            description: request.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Ownership never changes.
    pub fn apply(&mut self, update: UpdateTransactionRequest) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        self.updated_at = Utc::now();
    }
}

impl OwnedResource for StoredTransaction {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Repository for transaction records.
pub struct TransactionRepository<'a> {
    storage: &'a FileStorage,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    pub fn exists(&self, transaction_id: &str) -> bool {
        is_valid_id(transaction_id)
            && self
                .storage
                .exists(self.storage.paths().transaction(transaction_id))
    }

    /// Get a transaction by ID, `None` if absent.
    pub fn get(&self, transaction_id: &str) -> StorageResult<Option<StoredTransaction>> {
        if !self.exists(transaction_id) {
            return Ok(None);
        }
        self.storage
            .read_json(self.storage.paths().transaction(transaction_id))
            .map(Some)
    }

    pub fn create(&self, transaction: &StoredTransaction) -> StorageResult<()> {
        if self.exists(&transaction.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Transaction {}",
                transaction.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().transaction(&transaction.id), transaction)
    }

    pub fn update(&self, transaction: &StoredTransaction) -> StorageResult<()> {
        if !self.exists(&transaction.id) {
            return Err(StorageError::NotFound(format!("Transaction {}", transaction.id)));
        }
        self.storage
            .write_json(self.storage.paths().transaction(&transaction.id), transaction)
    }

    pub fn delete(&self, transaction_id: &str) -> StorageResult<()> {
        if !self.exists(transaction_id) {
            return Err(StorageError::NotFound(format!("Transaction {transaction_id}")));
        }
        self.storage
            .delete(self.storage.paths().transaction(transaction_id))
    }

    /// All transactions regardless of owner, newest date first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredTransaction>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().transactions_dir(), "json")?;

        let mut transactions = Vec::new();
        for id in ids {
            match self.get(&id) {
                Ok(Some(tx)) => transactions.push(tx),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(transaction_id = %id, error = %e, "Skipping unreadable transaction record")
                }
            }
        }
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(transactions)
    }
}

/// Record IDs become file names; keep them to a safe alphabet.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
