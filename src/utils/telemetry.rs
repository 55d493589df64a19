// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志订阅器
///
/// 默认级别为 `info,outreachrs=debug`，可通过 `RUST_LOG` 覆盖
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,outreachrs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 在测试中安装订阅器，重复调用时静默忽略
pub fn try_init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("warn,outreachrs=debug"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
