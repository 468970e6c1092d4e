// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media handling for the Courier relay.
//!
//! Inbound carrier attachments sit behind carrier-authenticated URLs, so
//! the relay downloads them once, keeps them in a local content store,
//! and re-exposes them through expiring HMAC-signed gateway URLs.

pub mod ingest;
pub mod sign;
pub mod store;

pub use ingest::MediaIngestor;
pub use sign::UrlSigner;
pub use store::ContentStore;
