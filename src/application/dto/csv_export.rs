// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_result::ScrapeResultEntry;

/// 导出列，与控制台导出的表头保持一致
pub const CSV_HEADERS: [&str; 8] = [
    "Website",
    "Business Name",
    "Emails",
    "Phone Numbers",
    "Social Media",
    "Email Subject",
    "Email Body",
    "Error",
];

const LIST_SEPARATOR: &str = "; ";

/// 将结果条目展开为 CSV 文本（RFC 4180，CRLF 换行）
pub fn entries_to_csv(entries: &[ScrapeResultEntry]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADERS.iter().map(|h| h.to_string()));

    for entry in entries {
        let social = entry
            .social_links
            .iter()
            .map(|(platform, url)| format!("{}: {}", platform, url))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        let (subject, body) = entry
            .outreach_email
            .as_ref()
            .map(|email| (email.subject.clone(), email.body.clone()))
            .unwrap_or_default();

        push_row(
            &mut out,
            [
                entry.url.clone(),
                entry.business_name.clone().unwrap_or_default(),
                entry.emails.join(LIST_SEPARATOR),
                entry.phones.join(LIST_SEPARATOR),
                social,
                subject,
                body,
                entry.error.clone().unwrap_or_default(),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row = fields
        .into_iter()
        .map(|field| escape_field(&field))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
