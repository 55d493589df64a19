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

use crate::config::settings::FetchSettings;
use crate::engines::traits::{FetchError, FetchedPage, PageFetchOutcome, PageFetcher};
use crate::engines::validators;
use crate::utils::text_encoding::decode_html_bytes;
use crate::utils::url_utils::parse_http_url;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

const ACCEPTED_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];

/// 抓取引擎
///
/// 基于reqwest实现的HTTP页面抓取，带超时、重定向上限和响应体大小上限
pub struct ReqwestEngine {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestEngine {
    /// 按抓取配置创建引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 抓取配置
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 创建成功
    /// * `Err(reqwest::Error)` - HTTP 客户端构建失败
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.8"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout())
            .redirect(redirect_policy(
                settings.max_redirects,
                !settings.allow_private_hosts,
            ))
            .build()?;

        Ok(Self { client, settings })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_redirect() {
            match find_source::<RedirectRejected>(&err) {
                Some(RedirectRejected::Blocked(reason)) => FetchError::Blocked(reason.clone()),
                _ => FetchError::TooManyRedirects(self.settings.max_redirects),
            }
        } else if let Some(status) = err.status() {
            FetchError::HttpStatusError(status.as_u16())
        } else {
            FetchError::ConnectionError(root_cause(&err))
        }
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedPage)` - 解码后的页面和最终URL
    /// * `Err(FetchError)` - 已分类的网络层错误
    async fn fetch(&self, url: &str) -> PageFetchOutcome {
        let target =
            parse_http_url(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        if !self.settings.allow_private_hosts {
            validators::validate_target(&target).await?;
        }

        let target_host = target.host_str().map(str::to_owned);
        let start = Instant::now();
        let mut response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Redirect hops only see IP literals; names are resolved here
        if !self.settings.allow_private_hosts
            && response.url().host_str() != target_host.as_deref()
        {
            validators::validate_target(response.url()).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatusError(status.as_u16()));
        }

        // A missing content type is treated as HTML
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("text/html")
            .to_string();

        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ACCEPTED_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(FetchError::UnsupportedContentType(mime));
        }

        let limit = self.settings.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let final_url = response.url().clone();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        let html = decode_html_bytes(&body, Some(&content_type));
        let response_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            url = %final_url,
            bytes = body.len(),
            response_time_ms,
            "Fetched page"
        );

        Ok(FetchedPage {
            html,
            final_url,
            status_code: status.as_u16(),
            content_type,
            response_time_ms,
        })
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// 重定向被策略拒绝的原因，作为 reqwest 错误的来源传出
#[derive(Debug, Error)]
enum RedirectRejected {
    #[error("too many redirects")]
    TooMany,
    #[error("redirect blocked: {0}")]
    Blocked(String),
}

/// 限制重定向次数；开启防护时拒绝指向私有地址的跳转
fn redirect_policy(max_redirects: usize, guard_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(RedirectRejected::TooMany);
        }
        if guard_private_hosts {
            if let Err(err) = validators::check_redirect_host(attempt.url()) {
                let reason = match err {
                    FetchError::Blocked(reason) => reason,
                    other => other.to_string(),
                };
                return attempt.error(RedirectRejected::Blocked(reason));
            }
        }
        attempt.follow()
    })
}

fn find_source<'a, E: std::error::Error + 'static>(err: &'a reqwest::Error) -> Option<&'a E> {
    let mut source = std::error::Error::source(err);
    while let Some(current) = source {
        if let Some(found) = current.downcast_ref::<E>() {
            return Some(found);
        }
        source = current.source();
    }
    None
}

/// reqwest 的顶层错误信息过于笼统，取最底层的原因
fn root_cause(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
