// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Finance Tracker - personal finance REST API
//!
//! Transactions and summaries served from a flat-file store, protected by
//! HS256 bearer tokens and a role/ownership authorization engine.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token service, permission catalog, authorization engine, guard
//! - `config` - Environment configuration
//! - `storage` - Flat-file JSON storage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
