// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AuthGuard, AuthorizationEngine, SigningSecret, TokenService};
use crate::storage::FileStorage;

/// Shared application state.
///
/// The guard is read-only after startup. Storage writes are serialized by
/// the lock.
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<AuthGuard>,
    pub storage: Arc<RwLock<FileStorage>>,
}

impl AppState {
    pub fn new(storage: FileStorage, guard: AuthGuard) -> Self {
        Self {
            guard: Arc::new(guard),
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    /// State with the default permission catalog.
    pub fn with_secret(storage: FileStorage, secret: SigningSecret) -> Self {
        Self::new(
            storage,
            AuthGuard::new(TokenService::new(secret), AuthorizationEngine::default()),
        )
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        self.guard.engine()
    }
}
