//! 外部 LLM 协作方
//!
//! 对助手来说 LLM 只是一个"给定系统提示和用户输入，返回一段文本或失败"的函数，
//! 通过 [`LlmClient`] 注入；默认实现 [`OpenAiClient`] 调用 OpenAI 兼容的
//! Chat Completions 接口，并带有请求超时。

mod client;
pub mod types;

use crate::config::GptConfig;
use crate::error::{AssistantError, LlmError, Result};
use crate::llm::client::post;
use crate::llm::types::{ChatCompletionRequest, Message};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发起一次无工具的单轮对话，返回模型的文本内容
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

pub fn assemble_req_header(api_key: &str) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();

    header_map.insert(
        "Authorization",
        format!("Bearer {}", api_key)
            .parse()
            .map_err(|e| AssistantError::Other(format!("Invalid Authorization header: {}", e)))?,
    );
    header_map.insert(
        "Content-Type",
        "application/json"
            .parse()
            .map_err(|e| AssistantError::Other(format!("Invalid Content-Type header: {}", e)))?,
    );
    Ok(header_map)
}

/// 基于 reqwest 的 OpenAI 兼容客户端
pub struct OpenAiClient {
    client: Client,
    config: GptConfig,
}

impl OpenAiClient {
    pub fn new(config: GptConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(system), Message::user(prompt)],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        let header_map = assemble_req_header(api_key)?;
        let response = post(&self.client, &request_body, header_map, &self.config.base_url).await?;
        response
            .first_text()
            .ok_or_else(|| LlmError::EmptyResponse.into())
    }
}
