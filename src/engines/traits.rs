// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 页面抓取错误类型
///
/// 每一种错误只影响对应的单个 URL，不会中断同批次的其他条目
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 在限定时间内没有收到响应
    #[error("timed out waiting for a response")]
    Timeout,
    /// DNS 解析失败、连接被拒绝或被重置
    #[error("connection error: {0}")]
    ConnectionError(String),
    /// 最终响应状态码不是 2xx
    #[error("HTTP status {0}")]
    HttpStatusError(u16),
    /// 响应体超过配置的字节上限
    #[error("response exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
    /// 响应不是 HTML 或纯文本
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    /// 重定向次数超过上限
    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),
    /// URL 无法解析或不是 http(s)
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// 目标地址被 SSRF 防护拒绝
    #[error("blocked: {0}")]
    Blocked(String),
}

impl FetchError {
    /// 稳定的错误分类代码，用于指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::ConnectionError(_) => "connection",
            FetchError::HttpStatusError(_) => "http_status",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::UnsupportedContentType(_) => "content_type",
            FetchError::TooManyRedirects(_) => "redirects",
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::Blocked(_) => "blocked",
        }
    }
}

/// 成功抓取的页面
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 解码后的 HTML 文本
    pub html: String,
    /// 跟随重定向后的最终 URL
    pub final_url: Url,
    /// HTTP状态码
    pub status_code: u16,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 单个 URL 的抓取结果，只归属于产生它的流水线实例
pub type PageFetchOutcome = Result<FetchedPage, FetchError>;

/// 页面抓取器特质
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取一个 URL，不做任何重试
    async fn fetch(&self, url: &str) -> PageFetchOutcome;

    /// 抓取器名称
    fn name(&self) -> &'static str;
}
