// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 联系方式提取（contact_extractor）：从页面 HTML 中提取联系人档案
/// - LLM服务（llm_service）：OpenAI 兼容的文本生成客户端
/// - 推广邮件生成（outreach_generator）：构造提示词并解析生成结果
pub mod contact_extractor;
pub mod llm_service;
pub mod outreach_generator;
