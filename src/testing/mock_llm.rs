//! 可脚本化的 Mock LLM 客户端，不发起任何网络请求。
//!
//! ```rust
//! use eh_assistant::testing::MockLlmClient;
//! use eh_assistant::llm::LlmClient;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockLlmClient::new().with_response("Madrid");
//! let reply = mock.complete("sé breve", "¿capital de España?").await.unwrap();
//! assert_eq!(reply, "Madrid");
//! assert_eq!(mock.last_prompt().as_deref(), Some("¿capital de España?"));
//! # }
//! ```

use crate::error::{AssistantError, LlmError, Result};
use crate::llm::LlmClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockReply {
    Text(String),
    Err(AssistantError),
}

/// 按顺序返回预设响应；队列耗尽后返回 `EmptyResponse` 错误。
#[derive(Clone, Default)]
pub struct MockLlmClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// 每次调用的 (system, prompt)
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Text(text.into()));
        self
    }

    pub fn with_error(self, err: AssistantError) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Err(err));
        self
    }

    /// 网络错误，用于测试回退路径
    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.with_error(AssistantError::Llm(LlmError::NetworkError(msg.into())))
    }

    /// 配额耗尽（429）
    pub fn with_quota_error(self) -> Self {
        self.with_error(AssistantError::Llm(LlmError::ApiError {
            status: 429,
            message: "Too Many Requests".to_string(),
        }))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_system(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(s, _)| s.clone())
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));

        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Err(e)) => Err(e),
            None => Err(AssistantError::Llm(LlmError::EmptyResponse)),
        }
    }
}
