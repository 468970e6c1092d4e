// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay orchestration for Courier.
//!
//! Ties identity resolution, context compression, media ingestion,
//! presence routing, and the fallback responder together per inbound
//! message, and runs the outbound delivery poll loop.

pub mod context;
pub mod dispatcher;
pub mod identity;
pub mod orchestrator;
pub mod presence;
pub mod tasks;

pub use dispatcher::Dispatcher;
pub use orchestrator::{DEFAULT_HELP_TEXT, Relay, RelayOptions, RelayOutcome};
