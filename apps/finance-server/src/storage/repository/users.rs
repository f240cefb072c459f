// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are provisioned from a seed file at start-up; there is no
//! registration endpoint. Each user is stored as `users/{id}.json`.
//!
//! ## Seed File
//!
//! ```json
//! [
//!   { "id": 1, "email": "admin@example.com", "password": "...", "role": "admin" }
//! ]
//! ```
//!
//! Plaintext passwords in the seed file are bcrypt-hashed before they are
//! written; users whose id already exists are left untouched.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::super::{FileStorage, StorageError, StorageResult};
use crate::auth::{Permission, Role};

/// User record on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Custom grants layered on top of the role defaults
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    /// bcrypt hash of the password
    pub password_hash: String,
}

impl StoredUser {
    /// A malformed stored hash never verifies.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// bcrypt work factor for stored passwords.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Salted bcrypt hash stored in place of the password.
pub fn hash_password(password: &str) -> StorageResult<String> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("unknown-user", PASSWORD_HASH_COST).ok());

/// Spend one bcrypt verification for a login whose email matched nobody,
/// so that it takes as long as a wrong password.
pub fn burn_password_check(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = bcrypt::verify(password, hash);
    }
}

/// One entry of the start-up seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    /// Plaintext; hashed before storage
    pub password: String,
}

impl SeedUser {
    pub fn into_stored(self) -> StorageResult<StoredUser> {
        Ok(StoredUser {
            id: self.id,
            email: self.email,
            name: self.name,
            role: self.role,
            permissions: self.permissions,
            password_hash: hash_password(&self.password)?,
        })
    }
}

/// Parse a seed file (a JSON array of [`SeedUser`]).
pub fn load_seed_file(path: impl AsRef<Path>) -> StorageResult<Vec<SeedUser>> {
    let raw = std::fs::read(path.as_ref())?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Repository for user records.
pub struct UserRepository<'a> {
    storage: &'a FileStorage,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    pub fn exists(&self, user_id: i64) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get a user by ID, `None` if absent.
    pub fn find_by_id(&self, user_id: i64) -> StorageResult<Option<StoredUser>> {
        if !self.exists(user_id) {
            return Ok(None);
        }
        self.storage.read_json(self.storage.paths().user(user_id)).map(Some)
    }

    /// Case-insensitive email lookup.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(user.id) {
            return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
        }
        self.storage.write_json(self.storage.paths().user(user.id), user)
    }

    /// Create every seed user not already present. Returns how many were
    /// created.
    pub fn seed(&self, users: Vec<SeedUser>) -> StorageResult<usize> {
        let mut created = 0;
        for seed in users {
            if self.exists(seed.id) {
                tracing::debug!(user_id = seed.id, "Seed user already present");
                continue;
            }
            if self.find_by_email(&seed.email)?.is_some() {
                return Err(StorageError::AlreadyExists(format!("User email {}", seed.email)));
            }
            let user = seed.into_stored()?;
            self.create(&user)?;
            tracing::info!(user_id = user.id, role = %user.role, "Seeded user");
            created += 1;
        }
        Ok(created)
    }

    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in ids.iter().filter_map(|id| id.parse::<i64>().ok()) {
            match self.find_by_id(id) {
                Ok(Some(user)) => users.push(user),
                Ok(None) => {}
                Err(e) => tracing::warn!(user_id = id, error = %e, "Skipping unreadable user record"),
            }
        }
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}
