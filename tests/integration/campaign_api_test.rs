// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    batch_settings, business_page, campaign_body, completion, html, mount_llm, mount_page,
    spawn_app,
};
use axum::http::StatusCode;
use outreachrs::domain::models::scrape_result::BATCH_DEADLINE_ERROR;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

const REPLY: &str = "Subject: A resource your readers might enjoy\n\nHi there,\n\nI'm writing on behalf of Acme.\n\nBest,\nSam";

#[tokio::test]
async fn test_entries_follow_input_order_with_bounded_pool() {
    let app = spawn_app(batch_settings(3, 30_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;

    let mut urls = Vec::new();
    for i in 0..10u64 {
        let page = format!("/site-{}", i);
        // Earlier sites answer last, so completion order is reversed
        let template = html(&business_page(&format!("Business {}", i), &format!("hello@business{}.co.uk", i)))
            .set_delay(Duration::from_millis((10 - i) * 30));
        mount_page(&app.sites, &page, template).await;
        urls.push(app.site_url(&page));
    }

    let response = app.server.post("/scrape").json(&campaign_body(&urls)).await;
    response.assert_status_ok();

    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries.len(), urls.len());
    for (i, (entry, url)) in entries.iter().zip(&urls).enumerate() {
        assert_eq!(entry["url"], url.as_str());
        assert_eq!(entry["business_name"], format!("Business {}", i));
        assert_eq!(entry["emails"], json!([format!("hello@business{}.co.uk", i)]));
        assert_eq!(entry["phones"], json!(["0113 496 0000"]));
        assert!(entry.get("error").is_none(), "{}", entry);

        let subject = entry["outreach_email"]["subject"].as_str().unwrap();
        assert_eq!(subject, "A resource your readers might enjoy");
        assert!(!subject.starts_with("Subject:"));
        assert!(entry["outreach_email"]["body"]
            .as_str()
            .unwrap()
            .contains("on behalf of Acme"));
    }
}

#[tokio::test]
async fn test_unreachable_url_is_contained_in_its_entry() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(&app.sites, "/ok", html(&business_page("Bright Smiles", "hi@brightsmiles.co.uk"))).await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let urls = vec![dead.clone(), app.site_url("/ok")];
    let response = app.server.post("/scrape").json(&campaign_body(&urls)).await;
    response.assert_status_ok();

    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries[0]["url"], dead.as_str());
    assert!(entries[0]["error"].as_str().unwrap().starts_with("fetch failed"));
    assert_eq!(entries[0]["emails"], json!([]));
    assert_eq!(entries[0]["phones"], json!([]));
    assert_eq!(entries[0]["social_links"], json!({}));
    assert!(entries[0].get("business_name").is_none());

    assert!(entries[1].get("error").is_none());
    assert_eq!(entries[1]["business_name"], "Bright Smiles");
}

#[tokio::test]
async fn test_http_error_status_is_reported_per_entry() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(&app.sites, "/gone", ResponseTemplate::new(404)).await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/gone")]))
        .await;
    response.assert_status_ok();

    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries[0]["error"], "fetch failed: HTTP status 404");
}

#[tokio::test]
async fn test_page_without_contacts_has_no_error() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(
        &app.sites,
        "/empty",
        html("<html><head><title>Under construction</title></head><body><p>Soon.</p></body></html>"),
    )
    .await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/empty")]))
        .await;
    response.assert_status_ok();

    let entry = &response.json::<Vec<Value>>()[0];
    assert!(entry.get("error").is_none());
    assert_eq!(entry["emails"], json!([]));
    assert_eq!(entry["phones"], json!([]));
    assert_eq!(entry["social_links"], json!({}));
    assert_eq!(entry["business_name"], "Under construction");
}

#[tokio::test]
async fn test_generation_failure_keeps_extracted_contacts() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(&app.llm, ResponseTemplate::new(401)).await;
    mount_page(&app.sites, "/dentist", html(&business_page("Bright Smiles", "hi@brightsmiles.co.uk"))).await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/dentist")]))
        .await;
    response.assert_status_ok();

    let entry = &response.json::<Vec<Value>>()[0];
    assert_eq!(entry["emails"], json!(["hi@brightsmiles.co.uk"]));
    assert_eq!(
        entry["social_links"]["linkedin"],
        "https://www.linkedin.com/company/bright-smiles"
    );
    assert!(entry.get("outreach_email").is_none());
    assert_eq!(
        entry["error"],
        "generation failed: credential rejected by the generation service"
    );
}

#[tokio::test]
async fn test_rate_limited_generation_is_retried() {
    let app = spawn_app(batch_settings(1, 30_000)).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&app.llm)
        .await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(&app.sites, "/dentist", html(&business_page("Bright Smiles", "hi@brightsmiles.co.uk"))).await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/dentist")]))
        .await;
    response.assert_status_ok();

    let entry = &response.json::<Vec<Value>>()[0];
    assert!(entry.get("error").is_none(), "{}", entry);
    assert!(entry["outreach_email"]["subject"].is_string());
    assert_eq!(app.llm.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_reply_is_generation_error() {
    let app = spawn_app(batch_settings(1, 30_000)).await;
    mount_llm(&app.llm, completion("Sure! Here's an idea for you.")).await;
    mount_page(&app.sites, "/dentist", html(&business_page("Bright Smiles", "hi@brightsmiles.co.uk"))).await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/dentist")]))
        .await;
    response.assert_status_ok();

    let entry = &response.json::<Vec<Value>>()[0];
    assert!(entry["error"]
        .as_str()
        .unwrap()
        .starts_with("generation failed: malformed generator output"));
    assert_eq!(entry["business_name"], "Bright Smiles");
}

#[tokio::test]
async fn test_duplicate_urls_are_processed_once() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(&app.sites, "/a", html(&business_page("Alpha", "a@alpha.io"))).await;
    mount_page(&app.sites, "/b", html(&business_page("Beta", "b@beta.io"))).await;

    let urls = vec![app.site_url("/a"), app.site_url("/b"), app.site_url("/a")];
    let response = app.server.post("/scrape").json(&campaign_body(&urls)).await;
    response.assert_status_ok();

    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["business_name"], "Alpha");
    assert_eq!(entries[1]["business_name"], "Beta");
    assert_eq!(app.site_requests().await, 2);
}

#[tokio::test]
async fn test_missing_backlink_is_rejected_before_any_fetch() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_page(&app.sites, "/a", html(&business_page("Alpha", "a@alpha.io"))).await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "urls": [app.site_url("/a")],
            "companyName": "Acme",
            "openaiKey": "sk-test"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("backlinkUrl"));
    assert_eq!(app.site_requests().await, 0);
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let app = spawn_app(batch_settings(2, 30_000)).await;

    for body in [
        json!({ "urls": [], "companyName": "Acme", "backlinkUrl": "https://acme.co/a", "openaiKey": "sk" }),
        json!({ "urls": ["https://a.co"], "companyName": "", "backlinkUrl": "https://acme.co/a", "openaiKey": "sk" }),
        json!({ "urls": ["https://a.co"], "companyName": "Acme", "backlinkUrl": "not a url", "openaiKey": "sk" }),
        json!({ "urls": ["https://a.co"], "companyName": "Acme", "backlinkUrl": "https://acme.co/a", "openaiKey": "" }),
    ] {
        let response = app.server.post("/scrape").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let app = spawn_app(batch_settings(2, 30_000)).await;

    let response = app
        .server
        .post("/scrape")
        .text("{ this is not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_deadline_marks_only_unfinished_entries() {
    let app = spawn_app(batch_settings(4, 1_000)).await;
    mount_llm(&app.llm, completion(REPLY)).await;
    mount_page(&app.sites, "/fast", html(&business_page("Fast", "f@fast.io"))).await;
    mount_page(
        &app.sites,
        "/slow",
        html(&business_page("Slow", "s@slow.io")).set_delay(Duration::from_secs(5)),
    )
    .await;

    let urls = vec![app.site_url("/slow"), app.site_url("/fast")];
    let response = app.server.post("/scrape").json(&campaign_body(&urls)).await;
    response.assert_status_ok();

    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries[0]["url"], urls[0].as_str());
    assert_eq!(entries[0]["error"], BATCH_DEADLINE_ERROR);
    assert_eq!(entries[0]["emails"], json!([]));
    assert!(entries[1].get("error").is_none());
    assert_eq!(entries[1]["business_name"], "Fast");
}

#[tokio::test]
async fn test_deadline_with_no_results_is_gateway_timeout() {
    let app = spawn_app(batch_settings(2, 300)).await;
    mount_page(
        &app.sites,
        "/slow",
        html("<p>late</p>").set_delay(Duration::from_secs(5)),
    )
    .await;

    let response = app
        .server
        .post("/scrape")
        .json(&campaign_body(&[app.site_url("/slow")]))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("deadline"));
}
