// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    batch_settings, business_page, campaign_body, completion, html, mount_llm, mount_page,
    spawn_app,
};
use axum::http::{header, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn test_csv_export_has_header_and_one_row_per_url() {
    let app = spawn_app(batch_settings(2, 30_000)).await;
    mount_llm(
        &app.llm,
        completion("Subject: Quick idea, for you\n\nHi there,\n\nBest,\nSam"),
    )
    .await;
    mount_page(&app.sites, "/dentist", html(&business_page("Bright Smiles", "hi@brightsmiles.co.uk"))).await;
    mount_page(&app.sites, "/gone", wiremock::ResponseTemplate::new(404)).await;

    let urls = vec![app.site_url("/dentist"), app.site_url("/gone")];
    let response = app.server.post("/scrape/csv").json(&campaign_body(&urls)).await;

    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert!(disposition.to_str().unwrap().contains("outreach_results.csv"));

    let text = response.text();
    let mut rows = text.split("\r\n");
    assert_eq!(
        rows.next().unwrap(),
        "Website,Business Name,Emails,Phone Numbers,Social Media,Email Subject,Email Body,Error"
    );

    let first = rows.next().unwrap();
    assert!(first.starts_with(&format!("{},Bright Smiles,hi@brightsmiles.co.uk,0113 496 0000,", urls[0])));
    assert!(first.contains("linkedin: https://www.linkedin.com/company/bright-smiles"));
    // Subject contains a comma and is quoted
    assert!(first.contains("\"Quick idea, for you\""));

    assert!(text.contains(&format!("{},,,,,,,fetch failed: HTTP status 404\r\n", urls[1])));
    assert!(text.ends_with("\r\n"));
}

#[tokio::test]
async fn test_csv_export_rejects_invalid_request() {
    let app = spawn_app(batch_settings(2, 30_000)).await;

    let response = app
        .server
        .post("/scrape/csv")
        .json(&json!({ "urls": [], "companyName": "Acme" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}
