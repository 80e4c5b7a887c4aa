//! 测试基础设施
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockLlmClient`] | 替代真实 LLM，测试 GPT 模式的开关与失败回退 |
//!
//! 所有 Mock 完全在内存中运行，通过 `with_response()` / `with_error()` 控制返回值，
//! 通过 `call_count()` / `last_prompt()` 检查调用情况。
//!
//! ```rust
//! use eh_assistant::assistant::Assistant;
//! use eh_assistant::memory::MemoryStore;
//! use eh_assistant::testing::MockLlmClient;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let llm = Arc::new(MockLlmClient::new().with_network_error("sin conexión"));
//! let mut eh = Assistant::new("E.H", MemoryStore::in_memory()).with_llm(llm.clone());
//!
//! // LLM 失败时回退到本地回复
//! let reply = eh.respond("cuéntame algo").await;
//! assert!(reply.starts_with("Te escucho"));
//! assert_eq!(llm.call_count(), 1);
//! # }
//! ```

mod mock_llm;

pub use mock_llm::MockLlmClient;
