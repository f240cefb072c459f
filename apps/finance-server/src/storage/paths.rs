// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the flat-file storage layout.

use std::path::{Path, PathBuf};

/// Default storage root, relative to the working directory.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user record.
    pub fn user(&self, user_id: i64) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Transaction Paths ==========

    /// Directory containing all transactions.
    pub fn transactions_dir(&self) -> PathBuf {
        self.root.join("transactions")
    }

    /// Path to a specific transaction.
    pub fn transaction(&self, transaction_id: &str) -> PathBuf {
        self.transactions_dir().join(format!("{transaction_id}.json"))
    }
}
