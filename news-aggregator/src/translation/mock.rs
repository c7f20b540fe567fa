use crate::translation::Translator;
use crate::types::{AggregatorError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted outcome for the next call to a [`MockTranslator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Fail { status: u16 },
}

/// Recorded arguments of one `translate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub target_lang: String,
    pub source_lang: Option<String>,
}

/// In-process translator for development and testing.
///
/// Replies are taken from the script in order; once it is exhausted every
/// call succeeds with `"{TARGET}:{text}"`, or fails if `fail_all` is set.
pub struct MockTranslator {
    name: String,
    script: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<MockCall>>,
    fail_all: bool,
    response_delay_ms: u64,
}

impl MockTranslator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail_all: false,
            response_delay_ms: 0,
        }
    }

    pub fn with_replies(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(replies);
        }
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.script.lock().ok().and_then(|mut s| s.pop_front())
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn translator_name(&self) -> String {
        format!("Mock Translator ({})", self.name)
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String> {
        if self.response_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.response_delay_ms)).await;
        }

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                text: text.to_string(),
                target_lang: target_lang.to_string(),
                source_lang: source_lang.map(str::to_string),
            });
        }

        match self.next_reply() {
            Some(MockReply::Text(reply)) => Ok(reply),
            Some(MockReply::Fail { status }) => Err(AggregatorError::Translation {
                status: Some(status),
                message: "scripted failure".to_string(),
            }),
            None if self.fail_all => Err(AggregatorError::Translation {
                status: None,
                message: "mock translator is set to fail".to_string(),
            }),
            None => Ok(format!("{}:{}", target_lang, text)),
        }
    }
}
