// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use outreachrs::application::usecases::CampaignUseCase;
use outreachrs::config::settings::{BatchSettings, FetchSettings, LlmSettings};
use outreachrs::domain::services::llm_service::LlmService;
use outreachrs::engines::reqwest_engine::ReqwestEngine;
use outreachrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BACKLINK_URL: &str = "https://acme.co/article";

/// 测试应用：HTTP 服务器加上模拟的目标网站和文本生成服务
pub struct TestApp {
    pub server: TestServer,
    pub sites: MockServer,
    pub llm: MockServer,
}

impl TestApp {
    pub fn site_url(&self, page: &str) -> String {
        format!("{}{}", self.sites.uri(), page)
    }

    /// 目标网站收到的请求数
    pub async fn site_requests(&self) -> usize {
        self.sites
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

pub fn batch_settings(worker_pool_size: usize, deadline_ms: u64) -> BatchSettings {
    BatchSettings {
        worker_pool_size,
        deadline_ms,
        max_urls: 50,
    }
}

pub async fn spawn_app(batch: BatchSettings) -> TestApp {
    outreachrs::utils::telemetry::try_init_for_tests();

    let sites = MockServer::start().await;
    let llm = MockServer::start().await;

    let fetch = FetchSettings {
        timeout_secs: 10,
        max_redirects: 3,
        max_body_bytes: 1024 * 1024,
        user_agent: "outreachrs-test/1.0".to_string(),
        allow_private_hosts: true,
    };
    let llm_settings = LlmSettings {
        api_base_url: llm.uri(),
        model: "gpt-4".to_string(),
        temperature: 0.7,
        max_tokens: 500,
        request_timeout_secs: 10,
        max_retries: 2,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
    };

    let fetcher = Arc::new(ReqwestEngine::new(fetch).expect("fetch client"));
    let generator = Arc::new(LlmService::new(llm_settings).expect("llm client"));
    let use_case = Arc::new(CampaignUseCase::new(fetcher, generator, &batch));
    let server = TestServer::new(routes::routes(use_case)).expect("test server");

    TestApp { server, sites, llm }
}

pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

pub fn business_page(name: &str, email: &str) -> String {
    format!(
        r#"<html>
            <head><title>{name} | Home</title></head>
            <body>
                <h1>{name}</h1>
                <p>Write to <a href="mailto:{email}">{email}</a> or call 0113 496 0000.</p>
                <a href="https://www.linkedin.com/company/{slug}">LinkedIn</a>
            </body>
        </html>"#,
        name = name,
        email = email,
        slug = name.to_lowercase().replace(' ', "-"),
    )
}

pub async fn mount_page(sites: &MockServer, page: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(template)
        .mount(sites)
        .await;
}

pub fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

pub async fn mount_llm(llm: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(template)
        .mount(llm)
        .await;
}

pub fn campaign_body(urls: &[String]) -> Value {
    json!({
        "urls": urls,
        "companyName": "Acme",
        "backlinkUrl": BACKLINK_URL,
        "openaiKey": "sk-test"
    })
}
