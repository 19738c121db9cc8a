//! Scripted provider for tests.

use super::{ChatProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Script {
    Reply(Option<String>),
    Fail(String),
}

/// Returns a fixed outcome for every call and remembers what it was asked.
pub struct MockChatProvider {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockChatProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(Script::Reply(Some(text.into())))
    }

    /// Upstream answered without any content.
    pub fn empty() -> Self {
        Self::new(Script::Reply(None))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Script::Fail(message.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(message) => Err(ProviderError::Other(message.clone())),
        }
    }
}
