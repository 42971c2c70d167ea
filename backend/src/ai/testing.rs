use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{AiClient, ImageMime, ImagePart};
use crate::error::{ScanError, ScanResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: Option<ImageMime>,
}

/// Replays canned replies in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<ScanResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn replying(text: impl Into<String>) -> Self {
        let client = Self::default();
        client.push_reply(Ok(text.into()));
        client
    }

    pub fn failing(error: ScanError) -> Self {
        let client = Self::default();
        client.push_reply(Err(error));
        client
    }

    pub fn push_reply(&self, reply: ScanResult<String>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self, call: RecordedCall) -> ScanResult<String> {
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScanError::Service("no scripted reply left".to_string())))
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn identify(&self, image: &ImagePart, prompt: &str) -> ScanResult<String> {
        self.next_reply(RecordedCall {
            prompt: prompt.to_string(),
            image: Some(image.mime),
        })
    }

    async fn complete(&self, prompt: &str) -> ScanResult<String> {
        self.next_reply(RecordedCall {
            prompt: prompt.to_string(),
            image: None,
        })
    }
}
