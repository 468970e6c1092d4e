// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Courier relay.
//!
//! Three routes: the carrier webhook (always 200, TwiML envelope), signed
//! media retrieval, and an unauthenticated health check.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, router, start_server};
