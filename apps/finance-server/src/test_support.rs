// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::collections::BTreeSet;

use tempfile::TempDir;

use crate::auth::{Role, SigningSecret};
use crate::state::AppState;
use crate::storage::{
    repository::hash_password, FileStorage, StoragePaths, StoredUser, UserRepository,
};

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_PASSWORD: &str = "correct horse";

/// Fresh state over an initialized temporary data directory.
pub fn test_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut storage = FileStorage::new(StoragePaths::new(temp_dir.path()));
    storage.initialize().expect("Failed to initialize storage");

    let state = AppState::with_secret(storage, SigningSecret::new(TEST_SECRET).unwrap());
    (state, temp_dir)
}

/// Persist a user with [`TEST_PASSWORD`].
pub async fn seed_user(state: &AppState, id: i64, email: &str, role: Role) -> StoredUser {
    let user = StoredUser {
        id,
        email: email.to_string(),
        name: Some(format!("User {id}")),
        role,
        permissions: BTreeSet::new(),
        password_hash: hash_password(TEST_PASSWORD).expect("hash password"),
    };
    let storage = state.storage.read().await;
    UserRepository::new(&storage).create(&user).expect("seed user");
    user
}

/// `Authorization` header value for a freshly issued token.
pub fn bearer(state: &AppState, id: i64, role: Role) -> String {
    let issued = state
        .guard
        .tokens()
        .issue(id, &format!("user{id}@example.com"), role)
        .expect("issue token");
    format!("Bearer {}", issued.token)
}
