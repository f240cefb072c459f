// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Flat-File Storage Module
//!
//! Users and transactions are persisted as individual JSON files under the
//! configured data directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/
//!     {user_id}.json          # Profile, role, custom grants, password digest
//!   transactions/
//!     {transaction_id}.json   # One record per transaction, owned by userId
//! ```
//!
//! Storage performs no authorization of its own. Handlers fetch a record,
//! then ask the [`AuthorizationEngine`](crate::auth::AuthorizationEngine)
//! whether the caller may act on it.

pub mod file_store;
pub mod paths;
pub mod repository;

pub use file_store::{FileStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    load_seed_file, SeedUser, StoredTransaction, StoredUser, TransactionRepository, UserRepository,
};
