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

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、页面抓取、批处理、文本生成和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 页面抓取配置
    pub fetch: FetchSettings,
    /// 批处理配置
    pub batch: BatchSettings,
    /// 文本生成服务配置
    pub llm: LlmSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 页面抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// 单个页面的请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最多跟随的重定向次数
    pub max_redirects: usize,
    /// 响应体字节上限
    pub max_body_bytes: u64,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 是否允许访问私有地址（仅用于测试和本地开发）
    pub allow_private_hosts: bool,
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 批处理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    /// 并发执行的流水线数量
    pub worker_pool_size: usize,
    /// 整个批次的截止时间（毫秒）
    pub deadline_ms: u64,
    /// 单次请求允许的最大 URL 数量
    pub max_urls: usize,
}

impl BatchSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// 文本生成服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// OpenAI 兼容接口的基础地址
    pub api_base_url: String,
    /// 使用的模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 回复的最大 token 数
    pub max_tokens: u32,
    /// 单次调用超时时间（秒）
    pub request_timeout_secs: u64,
    /// 遇到限流时的最大重试次数
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 最大退避时间（毫秒）
    pub max_backoff_ms: u64,
}

impl LlmSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、配置文件和环境变量，并校验结果
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("OUTREACHRS")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 仅使用内置默认值构建配置
    pub fn from_defaults() -> Result<Self, ConfigError> {
        let settings: Settings = Self::with_defaults(Config::builder())?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // Default fetch settings
            .set_default("fetch.timeout_secs", 30)?
            .set_default("fetch.max_redirects", 5)?
            .set_default("fetch.max_body_bytes", 5 * 1024 * 1024)?
            .set_default(
                "fetch.user_agent",
                "Mozilla/5.0 (compatible; outreachrs/0.1; +https://github.com/Kirky-X/outreachrs)",
            )?
            .set_default("fetch.allow_private_hosts", false)?
            // Default batch settings
            .set_default("batch.worker_pool_size", 4)?
            .set_default("batch.deadline_ms", 120_000)?
            .set_default("batch.max_urls", 50)?
            // Default generation settings
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.model", "gpt-4")?
            .set_default("llm.temperature", 0.7)?
            .set_default("llm.max_tokens", 500)?
            .set_default("llm.request_timeout_secs", 60)?
            .set_default("llm.max_retries", 3)?
            .set_default("llm.initial_backoff_ms", 1000)?
            .set_default("llm.max_backoff_ms", 10_000)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 校验配置的取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.worker_pool_size == 0 {
            return Err(ConfigError::Message(
                "batch.worker_pool_size must be at least 1".to_string(),
            ));
        }
        if self.batch.deadline_ms == 0 {
            return Err(ConfigError::Message(
                "batch.deadline_ms must be greater than zero".to_string(),
            ));
        }
        if self.batch.max_urls == 0 {
            return Err(ConfigError::Message(
                "batch.max_urls must be at least 1".to_string(),
            ));
        }
        if self.fetch.max_redirects == 0 {
            return Err(ConfigError::Message(
                "fetch.max_redirects must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.llm.api_base_url).is_err() {
            return Err(ConfigError::Message(format!(
                "llm.api_base_url is not a valid URL: {}",
                self.llm.api_base_url
            )));
        }
        Ok(())
    }

    /// 服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
