// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud fallback for the Courier relay.
//!
//! When a user's local agent is offline, the relay asks this crate for an
//! interim reply. [`client::CompletionHttpClient`] talks to a hosted
//! chat-completion API; [`responder::FallbackResponder`] wraps it with
//! prompt assembly, output cleanup, and canned-reply degradation so the
//! relay always has something to send.

pub mod client;
pub mod context;
pub mod prompt;
pub mod responder;
mod types;

pub use client::CompletionHttpClient;
pub use context::NullContextSource;
pub use responder::FallbackResponder;
