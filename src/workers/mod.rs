// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 单个 URL 的流水线（scrape_worker）和有界并发的批处理工作池（manager）
pub mod manager;
pub mod scrape_worker;

pub use manager::{BatchError, WorkerManager};
pub use scrape_worker::ScrapeWorker;
