// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Courier relay.
//!
//! A single tokio-rusqlite connection serializes all writes on one
//! background thread, which makes the append-only message log safe under
//! concurrent webhook invocations without locks or transactions in the
//! callers.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
