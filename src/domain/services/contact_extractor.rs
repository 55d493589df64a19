// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use url::Url;

use crate::domain::models::contact_profile::{ContactProfile, SocialPlatform};
use crate::utils::url_utils::{domain_display_name, parse_http_url, resolve_url, same_site};

const EXCERPT_MAX_CHARS: usize = 2000;
const MIN_PHONE_DIGITS: usize = 7;
const MIN_LOCAL_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9][a-z0-9._%+\-]*@[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)*\.[a-z]{2,24}\b")
        .expect("valid email regex")
});

static OBFUSCATED_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[\[\(\{]\s*at\s*[\]\)\}]\s*").expect("valid regex"));

static OBFUSCATED_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[\[\(\{]\s*dot\s*[\]\)\}]\s*").expect("valid regex"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{1,5}\)[\s.\-]?)?\d(?:[\s.\-]?\d){5,16}")
        .expect("valid phone regex")
});

static DATE_LIKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}[\-./]\d{1,2}[\-./]\d{1,2}|\d{1,2}[\-./]\d{1,2}[\-./]\d{2,4})$")
        .expect("valid date regex")
});

static YEAR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:19|20)\d{2}[\s.\-]+(?:19|20)\d{2}$").expect("valid year range regex")
});

static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}\.\d{2}[\s\-]+\d{1,2}\.\d{2}$").expect("valid time range regex")
});

static UK_STREET_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b\d+[a-z]?[\s,]+(?:[a-z]+[\s,]+)+?",
        r"(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|way|court|ct|place|pl)\b",
        r"[\s,]+(?:[a-z]+[\s,]+)+?",
        r"(?-i:[A-Z]{1,2}\d[A-Z\d]?\s?\d[A-Z]{2})\b",
    ))
    .expect("valid uk address regex")
});

static US_STREET_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b\d+[a-z]?[\s,]+(?:[a-z]+[\s,]+)+?",
        r"(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|way|court|ct|place|pl)\b",
        r"[\s,]+(?:[a-z]+[\s,]+)+?",
        r"(?-i:AL|AK|AZ|AR|CA|CO|CT|DE|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY)",
        r"[\s,]+\d{5}(?:-\d{4})?\b",
    ))
    .expect("valid us address regex")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a[href], link[href]"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("title"));
static SITE_NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="og:site_name"], meta[name="og:site_name"]"#));
static APP_NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[name="application-name"]"#));
static JSON_LD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"script[type="application/ld+json"]"#));
static ADDRESS_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("address"));

/// Domains that only ever appear in templates and tracking snippets.
const PLACEHOLDER_EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "domain.com",
    "yourdomain.com",
    "email.com",
    "sentry.io",
    "sentry.wixpress.com",
    "wixpress.com",
];

const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "css", "js",
];

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " :: ", " · ", " » "];

const GENERIC_TITLES: &[&str] = &["home", "homepage", "home page", "welcome", "index"];

const SHARE_PATH_MARKERS: &[&str] = &[
    "/sharer",
    "/share",
    "/intent/",
    "sharearticle",
    "/pin/create",
    "/dialog/",
];

const CONTACT_MARKERS: &[&str] = &["contact", "about-us", "get-in-touch", "reach-us"];

const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// 联系方式提取器
///
/// 从单个页面的 HTML 中提取邮箱、电话、社交链接和商家名称。提取永远不会失败，
/// 没有数据时返回空集合和空名称；畸形 HTML 由解析器尽力修复后照常提取。
pub struct ContactExtractor;

impl ContactExtractor {
    /// 提取联系人档案
    ///
    /// # 参数
    ///
    /// * `html` - 页面 HTML
    /// * `final_url` - 跟随重定向后的最终 URL，用于解析相对链接和推导名称
    pub fn extract(html: &str, final_url: &Url) -> ContactProfile {
        let document = Html::parse_document(html);
        let text = visible_text(&document);
        let json_ld = json_ld_nodes(&document);

        ContactProfile {
            business_name: business_name(&document, &json_ld, final_url),
            emails: extract_emails(&document, &text),
            phones: extract_phones(&document, &text),
            social_links: extract_social_links(&document, final_url),
            address: extract_address(&document, &json_ld, &text),
            contact_page: find_contact_page(&document, final_url),
            page_excerpt: excerpt(&text),
        }
    }
}

fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    WHITESPACE_RE.replace_all(&parts.join(" "), " ").into_owned()
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE_RE.replace_all(joined.trim(), " ").into_owned()
}

// === Emails ===

fn extract_emails(document: &Html, text: &str) -> Vec<String> {
    let deobfuscated = OBFUSCATED_DOT_RE.replace_all(text, ".");
    let deobfuscated = OBFUSCATED_AT_RE.replace_all(&deobfuscated, "@");

    let mailto_targets = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| {
            let (scheme, rest) = href.trim().split_once(':')?;
            if !scheme.eq_ignore_ascii_case("mailto") {
                return None;
            }
            let address = rest.split('?').next().unwrap_or_default();
            Some(address.replace("%40", "@").replace("%20", " "))
        })
        .collect::<Vec<_>>();

    let mut seen = HashSet::new();
    let mut emails = Vec::new();
    let sources = std::iter::once(deobfuscated.as_ref()).chain(mailto_targets.iter().map(String::as_str));
    for source in sources {
        for m in EMAIL_RE.find_iter(source) {
            let Some(email) = normalize_email(m.as_str()) else {
                continue;
            };
            if seen.insert(email.to_lowercase()) {
                emails.push(email);
            }
        }
    }
    emails
}

/// 保留本地部分原样，域名转小写；占位地址返回 `None`
fn normalize_email(raw: &str) -> Option<String> {
    let raw = raw.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
    let (local, domain) = raw.rsplit_once('@')?;
    let domain = domain.to_ascii_lowercase();

    if local.is_empty() || local.starts_with('.') || local.ends_with('.') {
        return None;
    }
    if PLACEHOLDER_EMAIL_DOMAINS
        .iter()
        .any(|placeholder| domain == *placeholder || domain.ends_with(&format!(".{}", placeholder)))
    {
        return None;
    }
    let tld = domain.rsplit('.').next().unwrap_or_default();
    if ASSET_EXTENSIONS.contains(&tld) {
        return None;
    }

    Some(format!("{}@{}", local, domain))
}

// === Phones ===

fn extract_phones(document: &Html, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phones = Vec::new();

    let mut push = |candidate: &str| {
        if let Some(key) = phone_key(candidate) {
            if seen.insert(key) {
                phones.push(candidate.to_string());
            }
        }
    };

    for m in PHONE_RE.find_iter(text) {
        let preceded_by_word = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric());
        if !preceded_by_word {
            push(m.as_str().trim());
        }
    }

    for href in document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
    {
        let Some((scheme, number)) = href.trim().split_once(':') else {
            continue;
        };
        if scheme.eq_ignore_ascii_case("tel") {
            let number = number.replace("%20", " ");
            push(number.trim());
        }
    }

    phones
}

/// 去掉分隔符后的比较键；不像电话号码时返回 `None`
fn phone_key(candidate: &str) -> Option<String> {
    if candidate.is_empty()
        || DATE_LIKE_RE.is_match(candidate)
        || YEAR_RANGE_RE.is_match(candidate)
        || TIME_RANGE_RE.is_match(candidate)
    {
        return None;
    }
    if candidate
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ' ' | '(' | ')')))
    {
        return None;
    }

    let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }

    let international = candidate.trim_start().starts_with('+');
    let has_area_code = candidate.contains('(');
    // Short local numbers only count with an explicit prefix or area code
    if !international && !has_area_code && digits.len() < MIN_LOCAL_PHONE_DIGITS {
        return None;
    }

    Some(if international {
        format!("+{}", digits)
    } else {
        digits
    })
}

// === Social links ===

fn extract_social_links(document: &Html, final_url: &Url) -> BTreeMap<SocialPlatform, String> {
    let mut links = BTreeMap::new();

    for href in document
        .select(&LINK_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
    {
        let Ok(resolved) = resolve_url(final_url, href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let Some(platform) = resolved.host_str().and_then(SocialPlatform::from_host) else {
            continue;
        };
        if is_share_link(&resolved) || resolved.path().trim_matches('/').is_empty() {
            continue;
        }
        links.entry(platform).or_insert_with(|| resolved.to_string());
    }

    links
}

/// 分享/发推链接只是把当前页面作为参数嵌入，不代表商家的主页
fn is_share_link(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    if SHARE_PATH_MARKERS.iter().any(|marker| path.contains(marker)) {
        return true;
    }
    url.query_pairs()
        .any(|(_, value)| parse_http_url(&value).is_some())
}

// === Business name ===

fn business_name(document: &Html, json_ld: &[Value], final_url: &Url) -> Option<String> {
    meta_content(document, &SITE_NAME_SELECTOR)
        .or_else(|| meta_content(document, &APP_NAME_SELECTOR))
        .or_else(|| json_ld_organization_name(json_ld))
        .or_else(|| title_name(document))
        .or_else(|| domain_display_name(final_url))
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|content| WHITESPACE_RE.replace_all(content.trim(), " ").into_owned())
        .find(|content| !content.is_empty())
}

fn title_name(document: &Html) -> Option<String> {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())?;
    Some(trim_title(&title))
}

/// 在第一个分隔符处截断标题；首段是“首页”之类的泛称时取下一段
pub(crate) fn trim_title(title: &str) -> String {
    let mut segments = vec![title];
    for separator in TITLE_SEPARATORS {
        segments = segments
            .into_iter()
            .flat_map(|segment| segment.split(*separator))
            .collect();
    }

    segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .find(|segment| !GENERIC_TITLES.contains(&segment.to_lowercase().as_str()))
        .unwrap_or_else(|| title.trim())
        .to_string()
}

// === JSON-LD ===

fn json_ld_nodes(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();
    for script in document.select(&JSON_LD_SELECTOR) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        flatten_json_ld(value, &mut nodes);
    }
    nodes
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten_json_ld(item, out)),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

fn is_organization(node: &Value) -> bool {
    let matches_type = |t: &str| {
        matches!(t, "Organization" | "Corporation" | "Store" | "Restaurant" | "Dentist")
            || t.ends_with("Business")
            || t.ends_with("Organization")
    };
    match node.get("@type") {
        Some(Value::String(t)) => matches_type(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches_type),
        _ => false,
    }
}

fn json_ld_organization_name(nodes: &[Value]) -> Option<String> {
    nodes
        .iter()
        .filter(|node| is_organization(node))
        .filter_map(|node| node.get("name").and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

// === Address and contact page ===

fn extract_address(document: &Html, json_ld: &[Value], text: &str) -> Option<String> {
    let from_json_ld = json_ld
        .iter()
        .filter_map(|node| node.get("address"))
        .find_map(format_address);

    from_json_ld
        .or_else(|| {
            document
                .select(&ADDRESS_SELECTOR)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
        .or_else(|| street_address_in_text(text))
}

/// 在正文中查找英式或美式街道地址（门牌号、街道、城市、邮编）
fn street_address_in_text(text: &str) -> Option<String> {
    [&*UK_STREET_ADDRESS_RE, &*US_STREET_ADDRESS_RE]
        .into_iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim_end_matches([',', ' ']).to_string())
}

fn format_address(address: &Value) -> Option<String> {
    match address {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(parts) => {
            let joined = [
                "streetAddress",
                "addressLocality",
                "addressRegion",
                "postalCode",
                "addressCountry",
            ]
            .iter()
            .filter_map(|key| parts.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        Value::Array(items) => items.iter().find_map(format_address),
        _ => None,
    }
}

fn find_contact_page(document: &Html, final_url: &Url) -> Option<String> {
    document.select(&ANCHOR_SELECTOR).find_map(|anchor| {
        let href = anchor.value().attr("href")?.trim();
        let resolved = resolve_url(final_url, href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") || !same_site(&resolved, final_url) {
            return None;
        }
        if resolved.path() == final_url.path() {
            return None;
        }

        let href_lower = href.to_lowercase();
        let text_lower = element_text(anchor).to_lowercase().replace(' ', "-");
        CONTACT_MARKERS
            .iter()
            .any(|marker| href_lower.contains(marker) || text_lower.contains(marker))
            .then(|| resolved.to_string())
    })
}

#[cfg(test)]
#[path = "contact_extractor_test.rs"]
mod tests;
