// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：推广活动、联系人档案和结果条目
/// - 服务（services）：联系方式提取、文本生成和推广邮件生成
///
/// 领域层不依赖于 HTTP 或具体的抓取实现
pub mod models;
pub mod services;
