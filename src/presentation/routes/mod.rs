// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::usecases::CampaignUseCase;
use crate::presentation::handlers::scrape_handler;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `use_case` - 推广活动用例，通过 `Extension` 注入处理器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(use_case: Arc<CampaignUseCase>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let campaign_routes = Router::new()
        .route("/scrape", post(scrape_handler::run_campaign))
        .route("/scrape/csv", post(scrape_handler::export_campaign_csv))
        .layer(Extension(use_case));

    Router::new()
        .merge(public_routes)
        .merge(campaign_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // The dashboard is served from a different origin
                .layer(CorsLayer::permissive()),
        )
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
