// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::histogram;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::models::campaign::CampaignContext;
use crate::domain::models::scrape_result::ScrapeResultEntry;
use crate::infrastructure::metrics::BATCH_DURATION_SECONDS;
use crate::workers::scrape_worker::ScrapeWorker;

/// 批次级别的失败，不属于任何单个 URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// 截止时间到达时一个条目都没有完成
    #[error("batch deadline exceeded before any result was ready")]
    DeadlineExceeded,

    /// 工作池已关闭，无法接收任务
    #[error("worker pool is closed")]
    PoolClosed,

    /// 流水线任务异常退出
    #[error("pipeline task failed: {0}")]
    TaskFailed(String),
}

/// 工作管理器
///
/// 以固定大小的工作池并发执行每个 URL 的流水线，结果按输入下标写入预分配的槽位，
/// 因此输出顺序与完成顺序无关。
pub struct WorkerManager {
    worker: Arc<ScrapeWorker>,
    pool_size: usize,
    deadline: Duration,
}

impl WorkerManager {
    pub fn new(worker: Arc<ScrapeWorker>, pool_size: usize, deadline: Duration) -> Self {
        Self {
            worker,
            pool_size: pool_size.max(1),
            deadline,
        }
    }

    /// 处理一个批次
    ///
    /// # 参数
    ///
    /// * `urls` - 按顺序排列的目标 URL
    /// * `context` - 活动参数
    ///
    /// # 返回值
    ///
    /// 与 `urls` 等长且顺序一致的结果；截止时间到达时未完成的条目为超时错误
    pub async fn run_batch(
        &self,
        urls: Vec<String>,
        context: CampaignContext,
    ) -> Result<Vec<ScrapeResultEntry>, BatchError> {
        let started = Instant::now();
        let deadline = started + self.deadline;
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let context = Arc::new(context);

        let mut slots: Vec<Option<ScrapeResultEntry>> = vec![None; urls.len()];
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let worker = self.worker.clone();
            let semaphore = semaphore.clone();
            let context = context.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| BatchError::PoolClosed)?;
                let entry = worker.process(index, &url, &context).await;
                Ok::<_, BatchError>((index, entry))
            });
        }

        let mut completed = 0usize;
        let collected = tokio::time::timeout_at(deadline, async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok((index, entry))) => {
                        slots[index] = Some(entry);
                        completed += 1;
                    }
                    Ok(Err(e)) => return Err(e),
                    Err(e) if e.is_cancelled() => continue,
                    Err(e) => return Err(BatchError::TaskFailed(e.to_string())),
                }
            }
            Ok(())
        })
        .await;

        match collected {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tasks.abort_all();
                return Err(e);
            }
            Err(_) => {
                tasks.abort_all();
                if completed == 0 {
                    warn!(urls = urls.len(), "Batch deadline exceeded with no completed entries");
                    return Err(BatchError::DeadlineExceeded);
                }
                warn!(
                    completed,
                    timed_out = urls.len() - completed,
                    "Batch deadline exceeded, remaining entries marked as timed out"
                );
            }
        }

        let elapsed = started.elapsed();
        histogram!(BATCH_DURATION_SECONDS).record(elapsed.as_secs_f64());
        info!(
            urls = urls.len(),
            completed,
            elapsed_ms = elapsed.as_millis() as u64,
            "Batch finished"
        );

        Ok(slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| slot.unwrap_or_else(|| ScrapeResultEntry::timed_out(url)))
            .collect())
    }
}
