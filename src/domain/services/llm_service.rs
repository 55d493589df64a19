// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::settings::LlmSettings;
use crate::domain::models::campaign::ApiCredential;
use crate::utils::retry_policy::RetryPolicy;

/// 文本生成错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// 凭证被拒绝（401/403）
    #[error("credential rejected by the generation service")]
    CredentialRejected,

    /// 重试耗尽后仍被限流
    #[error("rate limited by the generation service after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// 服务不可用、传输失败或响应中没有内容
    #[error("generation service unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::CredentialRejected => "credential_rejected",
            GenerationError::RateLimited { .. } => "rate_limited",
            GenerationError::Unavailable(_) => "unavailable",
        }
    }
}

/// 一次对话补全请求的提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// 文本生成后端
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 返回模型回复的原始文本
    async fn complete(
        &self,
        credential: &ApiCredential,
        prompt: &ChatPrompt,
    ) -> Result<String, GenerationError>;
}

enum AttemptFailure {
    RateLimited(Option<Duration>),
    Failed(GenerationError),
}

/// LLM服务 - OpenAI 兼容的对话补全客户端
///
/// # 配置
///
/// 通过 `[llm]` 配置节设置：
/// - `api_base_url` - API 基础 URL
/// - `model` - 模型名称（默认 gpt-4）
/// - `temperature` / `max_tokens` - 采样参数
/// - `max_retries` 等 - 限流时的退避参数
///
/// 凭证随每个活动请求传入，服务本身不持有密钥。
pub struct LlmService {
    client: reqwest::Client,
    settings: LlmSettings,
    retry_policy: RetryPolicy,
}

impl LlmService {
    pub fn new(settings: LlmSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        let retry_policy = RetryPolicy::from_settings(&settings);

        Ok(Self {
            client,
            settings,
            retry_policy,
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, prompt: &ChatPrompt) -> Value {
        json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens
        })
    }

    async fn send_once(
        &self,
        credential: &ApiCredential,
        body: &Value,
    ) -> Result<String, AttemptFailure> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptFailure::Failed(transport_error(&e)))?;

        let status = response.status();
        if status.is_success() {
            return read_content(response).await.map_err(AttemptFailure::Failed);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AttemptFailure::Failed(GenerationError::CredentialRejected))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                Err(AttemptFailure::RateLimited(retry_after(&response)))
            }
            _ => {
                let detail = error_detail(response).await;
                Err(AttemptFailure::Failed(GenerationError::Unavailable(
                    match detail {
                        Some(message) => format!("HTTP {}: {}", status.as_u16(), message),
                        None => format!("HTTP {}", status.as_u16()),
                    },
                )))
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn complete(
        &self,
        credential: &ApiCredential,
        prompt: &ChatPrompt,
    ) -> Result<String, GenerationError> {
        let body = self.request_body(prompt);
        let mut retries = 0;

        loop {
            match self.send_once(credential, &body).await {
                Ok(content) => {
                    debug!(
                        model = %self.settings.model,
                        retries,
                        chars = content.len(),
                        "Generation completed"
                    );
                    return Ok(content);
                }
                Err(AttemptFailure::RateLimited(hint)) => {
                    if !self.retry_policy.should_retry(retries) {
                        return Err(GenerationError::RateLimited {
                            attempts: retries + 1,
                        });
                    }
                    retries += 1;
                    let delay = self.retry_policy.backoff_with_hint(retries, hint);
                    warn!(
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Generation service rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptFailure::Failed(err)) => return Err(err),
            }
        }
    }
}

fn transport_error(err: &reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Unavailable("request timed out".to_string())
    } else {
        GenerationError::Unavailable(format!("request failed: {}", err))
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn read_content(response: Response) -> Result<String, GenerationError> {
    let body: Value = response
        .json()
        .await
        .map_err(|e| GenerationError::Unavailable(format!("invalid response body: {}", e)))?;

    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::Unavailable("response contained no message content".to_string())
        })
}

async fn error_detail(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    body["error"]["message"].as_str().map(str::to_string)
}

#[cfg(test)]
#[path = "llm_service_test.rs"]
mod tests;
