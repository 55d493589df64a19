// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::net::IpAddr;
use tokio::net::lookup_host;
use url::{Host, Url};

use crate::engines::traits::FetchError;

/// 验证目标 URL 是否安全 (防止 SSRF)
///
/// 只允许 http(s)，并检查主机解析出的所有 IP 都不是私有地址或环回地址
pub async fn validate_target(url: &Url) -> Result<(), FetchError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }

    let host = url
        .host()
        .ok_or_else(|| FetchError::InvalidUrl("missing host".to_string()))?;

    let domain = match host {
        Host::Ipv4(ip) => return check_ip(IpAddr::V4(ip)),
        Host::Ipv6(ip) => return check_ip(IpAddr::V6(ip)),
        Host::Domain(domain) => domain,
    };

    if is_localhost(domain) {
        return Err(FetchError::Blocked("localhost is not allowed".to_string()));
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = lookup_host((domain, port))
        .await
        .map_err(|e| FetchError::ConnectionError(format!("dns error: {}", e)))?;

    for addr in addrs {
        check_ip(addr.ip())?;
    }

    Ok(())
}

/// 检查重定向目标，不做 DNS 解析
///
/// 重定向策略是同步回调，这里只拦截 IP 字面量和 localhost；
/// 域名在响应返回后由 [`validate_target`] 对最终 URL 再检查一次
pub(crate) fn check_redirect_host(url: &Url) -> Result<(), FetchError> {
    match url.host() {
        Some(Host::Ipv4(ip)) => check_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => check_ip(IpAddr::V6(ip)),
        Some(Host::Domain(domain)) if is_localhost(domain) => {
            Err(FetchError::Blocked("localhost is not allowed".to_string()))
        }
        Some(Host::Domain(_)) => Ok(()),
        None => Err(FetchError::InvalidUrl("missing host".to_string())),
    }
}

fn is_localhost(domain: &str) -> bool {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

fn check_ip(ip: IpAddr) -> Result<(), FetchError> {
    if is_private_ip(ip) {
        Err(FetchError::Blocked(format!(
            "private address is not allowed: {}",
            ip
        )))
    } else {
        Ok(())
    }
}

pub(crate) fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private()
                || ipv4.is_loopback()
                || ipv4.is_link_local()
                || ipv4.is_multicast()
                || ipv4.is_unspecified()
                || ipv4.is_broadcast()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() || ipv6.is_multicast() {
                return true;
            }
            // Unique Local Address (fc00::/7)
            if (ipv6.segments()[0] & 0xfe00) == 0xfc00 {
                return true;
            }
            // Link-local (fe80::/10)
            if (ipv6.segments()[0] & 0xffc0) == 0xfe80 {
                return true;
            }
            // IPv4-mapped
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            false
        }
    }
}
