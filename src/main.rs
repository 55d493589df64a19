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

use anyhow::Context;
use outreachrs::application::usecases::CampaignUseCase;
use outreachrs::config::settings::Settings;
use outreachrs::domain::services::llm_service::{LlmService, TextGenerator};
use outreachrs::engines::reqwest_engine::ReqwestEngine;
use outreachrs::engines::traits::PageFetcher;
use outreachrs::infrastructure::metrics::init_metrics;
use outreachrs::presentation::routes;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use outreachrs::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting outreachrs...");

    // 2. Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    init_metrics(&settings.metrics)?;

    // 4. Initialize fetch engine and generation backend
    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        ReqwestEngine::new(settings.fetch.clone()).context("Failed to build HTTP client")?,
    );
    let text_generator: Arc<dyn TextGenerator> = Arc::new(
        LlmService::new(settings.llm.clone()).context("Failed to build generation client")?,
    );
    info!(
        pool_size = settings.batch.worker_pool_size,
        deadline_ms = settings.batch.deadline_ms,
        model = %settings.llm.model,
        "Pipeline initialized"
    );

    // 5. Build router
    let use_case = Arc::new(CampaignUseCase::new(fetcher, text_generator, &settings.batch));
    let app = routes::routes(use_case);

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
