// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;
use std::fmt;
use validator::{Validate, ValidationErrors};

/// 推广活动请求数据传输对象
///
/// 所有字段都有默认值，缺失字段会在校验阶段报告为 400，而不是反序列化失败
#[derive(Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequestDto {
    /// 目标网站列表
    #[serde(default)]
    #[validate(length(min = 1, message = "urls must contain at least one URL"))]
    pub urls: Vec<String>,
    /// 推广方名称
    #[serde(default)]
    #[validate(length(min = 1, message = "companyName is required"))]
    pub company_name: String,
    /// 反向链接地址
    #[serde(default)]
    #[validate(url(message = "backlinkUrl must be a valid absolute URL"))]
    pub backlink_url: String,
    /// 文本生成服务凭证
    #[serde(default)]
    #[validate(length(min = 1, message = "openaiKey is required"))]
    pub openai_key: String,
}

impl fmt::Debug for CampaignRequestDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CampaignRequestDto")
            .field("urls", &self.urls)
            .field("company_name", &self.company_name)
            .field("backlink_url", &self.backlink_url)
            .field("openai_key", &"***")
            .finish()
    }
}

/// 将校验错误整理为稳定顺序的单行信息
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}
