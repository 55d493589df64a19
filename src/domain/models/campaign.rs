// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::fmt;
use url::Url;

/// 文本生成服务的凭证
///
/// 不实现 `Display`，`Debug` 输出会被遮蔽，避免凭证出现在日志中
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// 仅在构造 Authorization 头时使用
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// 推广活动请求
///
/// URL 的顺序有意义，并且贯穿整个处理流程保持不变
#[derive(Debug, Clone)]
pub struct CampaignRequest {
    /// 待处理的目标网站
    pub urls: Vec<String>,
    /// 推广方（活动所有者）名称
    pub company_name: String,
    /// 希望对方链接的文章地址
    pub backlink_url: Url,
    /// 文本生成服务凭证
    pub credential: ApiCredential,
}

impl CampaignRequest {
    /// 去除重复的 URL，保留首次出现的位置
    pub fn dedup_urls(mut self) -> Self {
        let mut seen = HashSet::new();
        self.urls.retain(|url| seen.insert(url.clone()));
        self
    }
}

/// 传给文本生成环节的活动参数
#[derive(Debug, Clone)]
pub struct CampaignContext {
    pub company_name: String,
    pub backlink_url: Url,
    pub credential: ApiCredential,
}

impl From<&CampaignRequest> for CampaignContext {
    fn from(request: &CampaignRequest) -> Self {
        Self {
            company_name: request.company_name.clone(),
            backlink_url: request.backlink_url.clone(),
            credential: request.credential.clone(),
        }
    }
}
