// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 验证配置文件和环境变量两层覆盖
#[cfg(test)]
mod tests {
    use outreachrs::config::settings::Settings;

    #[test]
    fn test_config_loading_with_env_override() {
        std::env::set_var("OUTREACHRS__BATCH__WORKER_POOL_SIZE", "7");
        std::env::set_var("OUTREACHRS__LLM__MODEL", "gpt-4o-mini");

        let settings = Settings::new();

        std::env::remove_var("OUTREACHRS__BATCH__WORKER_POOL_SIZE");
        std::env::remove_var("OUTREACHRS__LLM__MODEL");

        let settings = settings.expect("configuration should load");
        assert_eq!(settings.batch.worker_pool_size, 7);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        // Values from config/default.toml survive
        assert_eq!(settings.batch.deadline_ms, 120_000);
        assert_eq!(settings.server.port, 5000);
        assert!(!settings.fetch.user_agent.is_empty());
    }
}
