// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 推广活动（campaign）：一次批处理请求的参数和凭证
/// - 联系人档案（contact_profile）：从单个页面提取的联系方式
/// - 处理结果（scrape_result）：与输入 URL 一一对应的结果条目和推广邮件
///
/// 所有实体都只在一次批处理调用中创建和使用，不做持久化。
pub mod campaign;
pub mod contact_profile;
pub mod scrape_result;
