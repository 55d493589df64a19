// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::application::dto::campaign_request::CampaignRequestDto;
use crate::application::dto::csv_export::entries_to_csv;
use crate::application::usecases::{CampaignError, CampaignUseCase};
use crate::domain::models::scrape_result::ScrapeResultEntry;
use crate::presentation::errors::AppError;

const CSV_FILENAME: &str = "outreach_results.csv";

/// 请求体不是合法 JSON 时同样按校验失败处理
fn parse_body(
    payload: Result<Json<CampaignRequestDto>, JsonRejection>,
) -> Result<CampaignRequestDto, CampaignError> {
    payload
        .map(|Json(dto)| dto)
        .map_err(|rejection| CampaignError::Validation(rejection.body_text()))
}

/// 运行推广活动，返回与输入等长且顺序一致的结果数组
pub async fn run_campaign(
    Extension(use_case): Extension<Arc<CampaignUseCase>>,
    payload: Result<Json<CampaignRequestDto>, JsonRejection>,
) -> Result<Json<Vec<ScrapeResultEntry>>, AppError> {
    let dto = parse_body(payload)?;
    let entries = use_case.execute(dto).await?;

    let failed = entries.iter().filter(|e| !e.is_success()).count();
    info!(entries = entries.len(), failed, "Campaign completed");
    Ok(Json(entries))
}

/// 运行推广活动并以 CSV 返回结果
pub async fn export_campaign_csv(
    Extension(use_case): Extension<Arc<CampaignUseCase>>,
    payload: Result<Json<CampaignRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let dto = parse_body(payload)?;
    let entries = use_case.execute(dto).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
        ],
        entries_to_csv(&entries),
    ))
}
