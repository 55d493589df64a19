// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

/// 将响应体字节解码为 UTF-8 文本
///
/// 优先使用 `Content-Type` 中声明的 charset；未声明时若字节本身是合法 UTF-8 则直接使用，
/// 否则交给 chardetng 猜测编码。解码永远不会失败，非法字节会被替换。
pub fn decode_html_bytes(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type.and_then(charset_from_content_type) {
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            debug!(
                "Body contained bytes invalid for declared charset {}",
                encoding.name()
            );
        }
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!("Detected body encoding: {}", encoding.name());

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches('"').as_bytes())
        } else {
            None
        }
    })
}
