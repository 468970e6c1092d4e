// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carrier integration for the Courier relay.
//!
//! Covers the three touchpoints with the external messaging provider: the
//! REST delivery API ([`client`]), the webhook acknowledgement format
//! ([`twiml`]), and inbound payload parsing ([`webhook`]).

pub mod client;
pub mod twiml;
pub mod webhook;

pub use client::CarrierHttpClient;
