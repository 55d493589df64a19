// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求 DTO 和推广活动用例，将 HTTP 层与领域逻辑分离
pub mod dto;
pub mod usecases;
