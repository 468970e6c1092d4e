// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock adapters for Courier tests.
//!
//! These stand in for the carrier, the completion model, and the user
//! context collaborator so orchestrator and dispatcher behavior can be
//! tested without HTTP.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use courier_core::error::CourierError;
use courier_core::traits::{CarrierClient, CompletionClient, PluginAdapter, UserContextSource};
use courier_core::types::{AdapterType, CompletionRequest, HealthStatus};
use semver::Version;

fn test_version() -> Version {
    Version::new(0, 0, 0)
}

/// Mock carrier that records sends and serves fixture media.
#[derive(Default)]
pub struct MockCarrier {
    /// Every (to, body) pair passed to `send_message`, in order.
    pub sent: Mutex<Vec<(String, String)>>,
    /// Destinations passed to `send_typing`, in order.
    pub typing: Mutex<Vec<String>>,
    /// Fixture media served by `download_media`, keyed by URL.
    pub media: Mutex<HashMap<String, (Vec<u8>, String)>>,
    /// When set, `send_message` fails.
    pub fail_sends: AtomicBool,
    /// When set, `send_typing` fails.
    pub fail_typing: AtomicBool,
    sid_counter: AtomicUsize,
}

impl MockCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_media(&self, url: &str, bytes: Vec<u8>, content_type: &str) {
        self.media
            .lock()
            .unwrap()
            .insert(url.to_string(), (bytes, content_type.to_string()));
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for MockCarrier {
    fn name(&self) -> &str {
        "mock-carrier"
    }
    fn version(&self) -> Version {
        test_version()
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Carrier
    }
    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }
    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl CarrierClient for MockCarrier {
    async fn send_message(&self, to: &str, body: &str) -> Result<String, CourierError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(CourierError::Carrier {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        let n = self.sid_counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("SM-mock-{n}"))
    }

    async fn send_typing(&self, to: &str) -> Result<(), CourierError> {
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(CourierError::Carrier {
                message: "mock typing failure".to_string(),
                source: None,
            });
        }
        self.typing.lock().unwrap().push(to.to_string());
        Ok(())
    }

    async fn download_media(&self, url: &str) -> Result<(Vec<u8>, String), CourierError> {
        self.media
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CourierError::Carrier {
                message: format!("no mock media at {url}"),
                source: None,
            })
    }
}

/// Mock completion model fed from a reply queue.
#[derive(Default)]
pub struct MockCompletions {
    /// Replies returned in order; an empty queue yields an error.
    pub replies: Mutex<VecDeque<String>>,
    /// Every request passed to `complete`, in order.
    pub requests: Mutex<Vec<CompletionRequest>>,
    /// When set, `complete` fails regardless of the queue.
    pub fail: AtomicBool,
}

impl MockCompletions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PluginAdapter for MockCompletions {
    fn name(&self) -> &str {
        "mock-completions"
    }
    fn version(&self) -> Version {
        test_version()
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }
    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }
    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionClient for MockCompletions {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CourierError> {
        self.requests.lock().unwrap().push(request);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CourierError::Model {
                message: "mock completion failure".to_string(),
                source: None,
            });
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CourierError::Model {
                message: "mock reply queue exhausted".to_string(),
                source: None,
            })
    }
}

/// Mock user-context collaborator returning a fixed block per user.
#[derive(Default)]
pub struct MockContextSource {
    pub blocks: Mutex<HashMap<String, String>>,
    /// When set, `context_block` fails.
    pub fail: AtomicBool,
}

impl MockContextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&self, user_id: &str, block: &str) {
        self.blocks
            .lock()
            .unwrap()
            .insert(user_id.to_string(), block.to_string());
    }
}

#[async_trait]
impl PluginAdapter for MockContextSource {
    fn name(&self) -> &str {
        "mock-context"
    }
    fn version(&self) -> Version {
        test_version()
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::UserContext
    }
    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        Ok(HealthStatus::Healthy)
    }
    async fn shutdown(&self) -> Result<(), CourierError> {
        Ok(())
    }
}

#[async_trait]
impl UserContextSource for MockContextSource {
    async fn context_block(&self, user_id: &str) -> Result<Option<String>, CourierError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CourierError::Internal("mock context failure".to_string()));
        }
        Ok(self.blocks.lock().unwrap().get(user_id).cloned())
    }
}
