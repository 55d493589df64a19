// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

use crate::domain::models::campaign::CampaignContext;
use crate::domain::models::contact_profile::ContactProfile;
use crate::domain::models::scrape_result::OutreachEmail;
use crate::domain::services::llm_service::{ChatPrompt, GenerationError, TextGenerator};

const SYSTEM_PERSONA: &str = "You are an experienced digital marketing professional writing \
outreach emails for link building. You write like a person, never like a template.";

const FALLBACK_RECIPIENT: &str = "your team";

/// 推广邮件生成错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutreachError {
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// 回复无法拆分为主题和正文
    #[error("malformed generator output: {0}")]
    MalformedOutput(String),
}

impl OutreachError {
    pub fn kind(&self) -> &'static str {
        match self {
            OutreachError::Generation(err) => err.kind(),
            OutreachError::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// 推广邮件生成器
///
/// 根据联系人档案和活动参数构造提示词，调用文本生成后端并解析回复
pub struct OutreachGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl OutreachGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// 为一个目标网站生成推广邮件
    ///
    /// # 参数
    ///
    /// * `profile` - 从目标网站提取的联系人档案
    /// * `site_url` - 目标网站 URL
    /// * `context` - 活动参数（推广方名称、反向链接、凭证）
    #[instrument(skip_all, fields(site_url = %site_url))]
    pub async fn generate(
        &self,
        profile: &ContactProfile,
        site_url: &str,
        context: &CampaignContext,
    ) -> Result<OutreachEmail, OutreachError> {
        let prompt = build_prompt(profile, site_url, context);
        let reply = self.generator.complete(&context.credential, &prompt).await?;
        parse_outreach_reply(&reply)
    }
}

/// 构造提示词；相同输入总是得到相同文本
pub fn build_prompt(profile: &ContactProfile, site_url: &str, context: &CampaignContext) -> ChatPrompt {
    let recipient = profile
        .business_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_RECIPIENT);

    let mut user = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        user,
        "Write a friendly, professional outreach email proposing a backlink."
    );
    let _ = writeln!(user);
    let _ = writeln!(user, "Business name: {}", recipient);
    let _ = writeln!(user, "Their website: {}", site_url);
    let _ = writeln!(user, "We are writing on behalf of: {}", context.company_name);
    let _ = writeln!(user, "Article we would like them to link to: {}", context.backlink_url);
    let _ = writeln!(user);
    let _ = writeln!(user, "Instructions:");
    let _ = writeln!(
        user,
        "1. Introduce yourself and mention that you found their website."
    );
    let _ = writeln!(
        user,
        "2. Compliment something specific about their site that suggests a shared interest."
    );
    let _ = writeln!(
        user,
        "3. Explain why their readers would find the article useful and include its link: {}",
        context.backlink_url
    );
    let _ = writeln!(
        user,
        "4. Mention that you are writing on behalf of {}.",
        context.company_name
    );
    let _ = writeln!(
        user,
        "5. Keep it concise, warm and non-spammy, in a natural human voice."
    );
    let _ = writeln!(user, "6. End with one clear call to action.");
    let _ = writeln!(
        user,
        "7. Format: the first line is `Subject: <subject>`, then one blank line, then the email body."
    );

    let excerpt = profile.page_excerpt.trim();
    if !excerpt.is_empty() {
        let _ = writeln!(user);
        let _ = writeln!(user, "Context from their website:");
        let _ = writeln!(user, "{}", excerpt);
    }

    ChatPrompt {
        system: SYSTEM_PERSONA.to_string(),
        user: user.trim_end().to_string(),
    }
}

/// 将生成的回复拆分为主题和正文
///
/// 第一行为主题（去掉 `Subject:` 标签），其后第一个空行之后的内容为正文
pub fn parse_outreach_reply(reply: &str) -> Result<OutreachEmail, OutreachError> {
    let lines: Vec<&str> = reply
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    let mut rest = lines.iter().skip_while(|line| line.trim().is_empty());
    let subject_line = rest
        .next()
        .ok_or_else(|| OutreachError::MalformedOutput("empty reply".to_string()))?;
    let subject = strip_subject_label(subject_line);
    if subject.is_empty() {
        return Err(OutreachError::MalformedOutput("empty subject".to_string()));
    }

    let remaining: Vec<&str> = rest.copied().collect();
    let separator = remaining
        .iter()
        .position(|line| line.trim().is_empty())
        .ok_or_else(|| {
            OutreachError::MalformedOutput("no blank line between subject and body".to_string())
        })?;

    let body = remaining[separator + 1..].join("\n").trim().to_string();
    if body.is_empty() {
        return Err(OutreachError::MalformedOutput("empty body".to_string()));
    }

    Ok(OutreachEmail { subject, body })
}

fn strip_subject_label(line: &str) -> String {
    let trimmed = line.trim().trim_start_matches('#').trim();
    let unbolded = trimmed.strip_prefix("**").unwrap_or(trimmed);

    let without_label = match unbolded.get(..8) {
        Some(label) if label.eq_ignore_ascii_case("subject:") => &unbolded[8..],
        _ => unbolded,
    };

    without_label
        .trim_start_matches("**")
        .trim_end_matches("**")
        .trim()
        .to_string()
}
