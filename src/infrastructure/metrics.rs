// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use crate::config::settings::MetricsSettings;

pub const PAGES_FETCHED_TOTAL: &str = "outreachrs_pages_fetched_total";
pub const FETCH_DURATION_SECONDS: &str = "outreachrs_fetch_duration_seconds";
pub const GENERATIONS_TOTAL: &str = "outreachrs_generations_total";
pub const BATCHES_TOTAL: &str = "outreachrs_batches_total";
pub const BATCH_DURATION_SECONDS: &str = "outreachrs_batch_duration_seconds";

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册指标说明。未启用时什么也不做，
/// `metrics` 宏在没有 recorder 的情况下是空操作。
pub fn init_metrics(settings: &MetricsSettings) -> Result<()> {
    if !settings.enabled {
        return Ok(());
    }

    let addr: SocketAddr = settings
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", settings.listen_addr))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_counter!(
        PAGES_FETCHED_TOTAL,
        "Pages fetched, labelled by outcome (ok or the fetch error kind)"
    );
    describe_histogram!(
        FETCH_DURATION_SECONDS,
        "Time to fetch and read a target page in seconds"
    );
    describe_counter!(
        GENERATIONS_TOTAL,
        "Outreach generations, labelled by outcome (ok or the error kind)"
    );
    describe_counter!(BATCHES_TOTAL, "Campaign batches processed");
    describe_histogram!(
        BATCH_DURATION_SECONDS,
        "Wall-clock duration of campaign batches in seconds"
    );

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
