//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider};
use crate::{Error, Result};

/// What the mock does on each call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text.
    Text(String),
    /// Fail with a provider error.
    Fail(String),
    /// Sleep before answering, to exercise timeouts.
    Delayed(Duration, String),
}

/// A [`ModelProvider`] that replays scripted replies and records requests.
///
/// Once the script runs out every call repeats the last reply.
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new([MockReply::Text(text.into())])
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::new([MockReply::Fail("mock failure".to_string())])
    }

    /// Requests seen so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> MockReply {
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone()
            .unwrap_or_else(|| MockReply::Fail("no scripted reply".to_string()))
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match self.next_reply() {
            MockReply::Text(text) => Ok(ChatResponse::text(text)),
            MockReply::Fail(message) => Err(Error::ProviderApi(message)),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(ChatResponse::text(text))
            }
        }
    }
}
