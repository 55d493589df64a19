// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{Host, ParseError, Url};

/// Second-level labels that sit under a country-code TLD, e.g. `co.uk`.
const SECOND_LEVEL_LABELS: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu", "ltd", "plc"];

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 解析为 http(s) 绝对 URL
pub fn parse_http_url(input: &str) -> Option<Url> {
    let url = Url::parse(input.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// 主机名去掉 `www.` 前缀后的形式
pub fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// 判断两个 URL 是否属于同一站点（忽略 `www.`）
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (bare_host(a), bare_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// 从域名推导一个可读的名称
///
/// `www.tanglewood-care.co.uk` -> `Tanglewood Care`；IP 地址返回 `None`
pub fn domain_display_name(url: &Url) -> Option<String> {
    let domain = match url.host()? {
        Host::Domain(domain) => domain.to_ascii_lowercase(),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    let labels: Vec<&str> = domain
        .trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty() && *label != "www")
        .collect();

    let registrable = match labels.len() {
        0 => return None,
        1 => labels[0],
        n => {
            let tld = labels[n - 1];
            let second = labels[n - 2];
            if n >= 3 && tld.len() == 2 && SECOND_LEVEL_LABELS.contains(&second) {
                labels[n - 3]
            } else {
                second
            }
        }
    };

    let name = registrable
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
