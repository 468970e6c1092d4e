// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Courier relay.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The relay
//! orchestrator only ever sees these traits, never concrete clients.

pub mod adapter;
pub mod carrier;
pub mod completion;
pub mod context;
pub mod storage;

pub use adapter::PluginAdapter;
pub use carrier::CarrierClient;
pub use completion::CompletionClient;
pub use context::UserContextSource;
pub use storage::StorageAdapter;
