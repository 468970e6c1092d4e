// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Courier relay.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Courier workspace. Concrete adapters
//! (SQLite storage, carrier HTTP client, completion client) implement the
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CourierError;
pub use types::{AdapterType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{
    CarrierClient, CompletionClient, PluginAdapter, StorageAdapter, UserContextSource,
};
