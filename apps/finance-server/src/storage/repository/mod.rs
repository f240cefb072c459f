// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to file storage.

pub mod transactions;
pub mod users;

pub use transactions::{StoredTransaction, TransactionRepository};
pub use users::{
    burn_password_check, hash_password, load_seed_file, SeedUser, StoredUser, UserRepository,
};
