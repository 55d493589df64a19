// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::models::contact_profile::{ContactProfile, SocialPlatform};

/// 批次截止时仍未完成的条目使用的错误信息
pub const BATCH_DEADLINE_ERROR: &str = "timeout: batch deadline exceeded";

/// 推广邮件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachEmail {
    /// 单行主题，不带 "Subject:" 前缀
    pub subject: String,
    /// 正文
    pub body: String,
}

/// 单个流水线实例的状态
///
/// `Pending → Fetching → (FetchFailed | Fetched) → Extracting → Generating → (Generated | GenerationFailed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Fetching,
    FetchFailed,
    Fetched,
    Extracting,
    Generating,
    Generated,
    GenerationFailed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::FetchFailed | PipelineState::Generated | PipelineState::GenerationFailed
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Pending => "pending",
            PipelineState::Fetching => "fetching",
            PipelineState::FetchFailed => "fetch_failed",
            PipelineState::Fetched => "fetched",
            PipelineState::Extracting => "extracting",
            PipelineState::Generating => "generating",
            PipelineState::Generated => "generated",
            PipelineState::GenerationFailed => "generation_failed",
        };
        f.write_str(name)
    }
}

/// 批处理结果条目
///
/// 允许部分成功：有联系方式但生成失败时，联系方式照常返回，`error` 说明生成失败的原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResultEntry {
    /// 输入 URL 的原样回显
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<SocialPlatform, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach_email: Option<OutreachEmail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResultEntry {
    fn empty(url: impl Into<String>, error: Option<String>) -> Self {
        Self {
            url: url.into(),
            business_name: None,
            emails: Vec::new(),
            phones: Vec::new(),
            social_links: BTreeMap::new(),
            address: None,
            contact_page: None,
            outreach_email: None,
            error,
        }
    }

    fn from_profile(url: impl Into<String>, profile: ContactProfile) -> Self {
        Self {
            url: url.into(),
            business_name: profile.business_name,
            emails: profile.emails,
            phones: profile.phones,
            social_links: profile.social_links,
            address: profile.address,
            contact_page: profile.contact_page,
            outreach_email: None,
            error: None,
        }
    }

    /// 终态 `FetchFailed`：没有任何联系方式字段
    pub fn from_fetch_failure(url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::empty(url, Some(format!("fetch failed: {}", error)))
    }

    /// 终态 `Generated`
    pub fn from_generation(
        url: impl Into<String>,
        profile: ContactProfile,
        email: OutreachEmail,
    ) -> Self {
        let mut entry = Self::from_profile(url, profile);
        entry.outreach_email = Some(email);
        entry
    }

    /// 终态 `GenerationFailed`：保留已提取的联系方式
    pub fn from_generation_failure(
        url: impl Into<String>,
        profile: ContactProfile,
        error: impl fmt::Display,
    ) -> Self {
        let mut entry = Self::from_profile(url, profile);
        entry.error = Some(format!("generation failed: {}", error));
        entry
    }

    /// 批次截止时仍未完成
    pub fn timed_out(url: impl Into<String>) -> Self {
        Self::empty(url, Some(BATCH_DEADLINE_ERROR.to_string()))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
