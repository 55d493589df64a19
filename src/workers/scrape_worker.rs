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

use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::campaign::CampaignContext;
use crate::domain::models::scrape_result::{PipelineState, ScrapeResultEntry};
use crate::domain::services::contact_extractor::ContactExtractor;
use crate::domain::services::outreach_generator::OutreachGenerator;
use crate::engines::traits::PageFetcher;
use crate::infrastructure::metrics::{
    FETCH_DURATION_SECONDS, GENERATIONS_TOTAL, PAGES_FETCHED_TOTAL,
};

/// 抓取工作者
///
/// 对单个 URL 执行 抓取 → 提取 → 生成 流水线。任何环节的失败都被转换为
/// 结果条目的 `error` 字段，不会影响同一批次中的其他 URL。
pub struct ScrapeWorker {
    fetcher: Arc<dyn PageFetcher>,
    generator: Arc<OutreachGenerator>,
}

impl ScrapeWorker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, generator: Arc<OutreachGenerator>) -> Self {
        Self { fetcher, generator }
    }

    /// 处理一个 URL，总是返回一个结果条目
    #[instrument(skip(self, context), fields(engine = self.fetcher.name()))]
    pub async fn process(
        &self,
        index: usize,
        url: &str,
        context: &CampaignContext,
    ) -> ScrapeResultEntry {
        let mut state = PipelineState::Pending;
        transition(&mut state, PipelineState::Fetching);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => {
                counter!(PAGES_FETCHED_TOTAL, "outcome" => "ok").increment(1);
                histogram!(FETCH_DURATION_SECONDS).record(page.response_time_ms as f64 / 1000.0);
                debug!(
                    status = page.status_code,
                    content_type = %page.content_type,
                    response_time_ms = page.response_time_ms,
                    final_url = %page.final_url,
                    "Page fetched"
                );
                transition(&mut state, PipelineState::Fetched);
                page
            }
            Err(e) => {
                counter!(PAGES_FETCHED_TOTAL, "outcome" => e.kind()).increment(1);
                transition(&mut state, PipelineState::FetchFailed);
                warn!(error = %e, kind = e.kind(), "Fetch failed");
                return ScrapeResultEntry::from_fetch_failure(url, e);
            }
        };

        transition(&mut state, PipelineState::Extracting);
        let profile = ContactExtractor::extract(&page.html, &page.final_url);
        debug!(
            emails = profile.emails.len(),
            phones = profile.phones.len(),
            social = profile.social_links.len(),
            business_name = ?profile.business_name,
            "Contacts extracted"
        );
        if profile.has_no_contacts() {
            info!("No contact details found on page");
        }

        transition(&mut state, PipelineState::Generating);
        let site_url = page.final_url.as_str();
        match self.generator.generate(&profile, site_url, context).await {
            Ok(email) => {
                counter!(GENERATIONS_TOTAL, "outcome" => "ok").increment(1);
                transition(&mut state, PipelineState::Generated);
                ScrapeResultEntry::from_generation(url, profile, email)
            }
            Err(e) => {
                counter!(GENERATIONS_TOTAL, "outcome" => e.kind()).increment(1);
                transition(&mut state, PipelineState::GenerationFailed);
                warn!(error = %e, kind = e.kind(), "Generation failed");
                ScrapeResultEntry::from_generation_failure(url, profile, e)
            }
        }
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(
        !state.is_terminal(),
        "pipeline already finished in state {}",
        state
    );
    debug!(from = %state, to = %next, "Pipeline state");
    *state = next;
}
