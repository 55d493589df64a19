// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 受支持的社交平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Facebook,
    Instagram,
    Linkedin,
    Pinterest,
    Tiktok,
    Twitter,
    Youtube,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 7] = [
        SocialPlatform::Facebook,
        SocialPlatform::Instagram,
        SocialPlatform::Linkedin,
        SocialPlatform::Pinterest,
        SocialPlatform::Tiktok,
        SocialPlatform::Twitter,
        SocialPlatform::Youtube,
    ];

    /// 属于该平台的域名（含子域名）
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            SocialPlatform::Facebook => &["facebook.com", "fb.me", "fb.com"],
            SocialPlatform::Instagram => &["instagram.com"],
            SocialPlatform::Linkedin => &["linkedin.com"],
            SocialPlatform::Pinterest => &["pinterest.com", "pinterest.co.uk", "pin.it"],
            SocialPlatform::Tiktok => &["tiktok.com"],
            SocialPlatform::Twitter => &["twitter.com", "x.com"],
            SocialPlatform::Youtube => &["youtube.com", "youtu.be"],
        }
    }

    /// 按主机名匹配平台
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        Self::ALL.into_iter().find(|platform| {
            platform
                .domains()
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Pinterest => "pinterest",
            SocialPlatform::Tiktok => "tiktok",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Youtube => "youtube",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 联系人档案
///
/// 完全由一次页面抓取结果推导而来，生成后不再修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactProfile {
    /// 商家名称
    pub business_name: Option<String>,
    /// 邮箱地址（按首次出现顺序，已去重）
    pub emails: Vec<String>,
    /// 电话号码（保留原始格式，已去重）
    pub phones: Vec<String>,
    /// 每个平台第一个匹配的链接
    pub social_links: BTreeMap<SocialPlatform, String>,
    /// 实体地址
    pub address: Option<String>,
    /// 检测到的联系页面（不会被抓取）
    pub contact_page: Option<String>,
    /// 页面正文摘录，仅用作生成提示的上下文
    #[serde(skip)]
    pub page_excerpt: String,
}

impl ContactProfile {
    /// 是否没有提取到任何联系方式
    pub fn has_no_contacts(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.social_links.is_empty()
    }
}
