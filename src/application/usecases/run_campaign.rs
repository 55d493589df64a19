// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::application::dto::campaign_request::{validation_message, CampaignRequestDto};
use crate::config::settings::BatchSettings;
use crate::domain::models::campaign::{ApiCredential, CampaignContext, CampaignRequest};
use crate::domain::models::scrape_result::ScrapeResultEntry;
use crate::domain::services::llm_service::TextGenerator;
use crate::domain::services::outreach_generator::OutreachGenerator;
use crate::engines::traits::PageFetcher;
use crate::infrastructure::metrics::BATCHES_TOTAL;
use crate::utils::url_utils::parse_http_url;
use crate::workers::{BatchError, ScrapeWorker, WorkerManager};

// === Section: Errors ===

/// 请求级别的错误；单个 URL 的失败不会出现在这里
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CampaignError {
    #[error("{0}")]
    Validation(String),

    #[error("batch deadline exceeded before any result was ready")]
    DeadlineExceeded,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    System(String),
}

impl CampaignError {
    pub fn kind(&self) -> &'static str {
        match self {
            CampaignError::Validation(_) => "validation",
            CampaignError::DeadlineExceeded => "deadline_exceeded",
            CampaignError::Unavailable(_) => "unavailable",
            CampaignError::System(_) => "system",
        }
    }
}

impl From<BatchError> for CampaignError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::DeadlineExceeded => CampaignError::DeadlineExceeded,
            BatchError::PoolClosed => CampaignError::Unavailable(err.to_string()),
            BatchError::TaskFailed(_) => CampaignError::System(err.to_string()),
        }
    }
}

// === Section: Use Case Definition ===

pub struct CampaignUseCase {
    manager: WorkerManager,
    max_urls: usize,
}

// === Section: Implementation ===

impl CampaignUseCase {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        text_generator: Arc<dyn TextGenerator>,
        settings: &BatchSettings,
    ) -> Self {
        let generator = Arc::new(OutreachGenerator::new(text_generator));
        let worker = Arc::new(ScrapeWorker::new(fetcher, generator));
        Self {
            manager: WorkerManager::new(worker, settings.worker_pool_size, settings.deadline()),
            max_urls: settings.max_urls,
        }
    }

    /// 校验请求并处理整个批次
    ///
    /// # 返回值
    ///
    /// * `Ok(entries)` - 与去重后的 URL 列表等长且顺序一致
    /// * `Err(CampaignError)` - 请求校验失败或批次级别的失败
    #[instrument(skip_all, fields(urls = request_dto.urls.len()))]
    pub async fn execute(
        &self,
        request_dto: CampaignRequestDto,
    ) -> Result<Vec<ScrapeResultEntry>, CampaignError> {
        let request = self.map_dto_to_request(request_dto).inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "Campaign request rejected");
        })?;
        info!(
            urls = request.urls.len(),
            company_name = %request.company_name,
            "Starting campaign batch"
        );

        let context = CampaignContext::from(&request);
        let entries = self.manager.run_batch(request.urls, context).await?;
        counter!(BATCHES_TOTAL).increment(1);
        Ok(entries)
    }

    fn map_dto_to_request(&self, dto: CampaignRequestDto) -> Result<CampaignRequest, CampaignError> {
        dto.validate()
            .map_err(|e| CampaignError::Validation(validation_message(&e)))?;

        let company_name = dto.company_name.trim().to_string();
        if company_name.is_empty() {
            return Err(CampaignError::Validation("companyName is required".to_string()));
        }
        if dto.openai_key.trim().is_empty() {
            return Err(CampaignError::Validation("openaiKey is required".to_string()));
        }
        let backlink_url = parse_http_url(&dto.backlink_url).ok_or_else(|| {
            CampaignError::Validation("backlinkUrl must be an absolute http(s) URL".to_string())
        })?;

        let urls: Vec<String> = dto.urls.iter().map(|url| url.trim().to_string()).collect();
        if urls.iter().any(String::is_empty) {
            return Err(CampaignError::Validation("urls must not contain blank entries".to_string()));
        }

        let request = CampaignRequest {
            urls,
            company_name,
            backlink_url,
            credential: ApiCredential::new(dto.openai_key.trim()),
        }
        .dedup_urls();

        if request.urls.len() > self.max_urls {
            return Err(CampaignError::Validation(format!(
                "at most {} urls are allowed per request, got {}",
                self.max_urls,
                request.urls.len()
            )));
        }

        Ok(request)
    }
}
