// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 将目标域名或完整URL规范化为可比较的主机名
///
/// 小写化、去掉协议前缀与 `www.`，丢弃路径和端口。
/// 规范化是幂等的：配置的目标域名与页面上发现的链接
/// 必须经过同一个函数后再做比较。
pub fn normalize_host(input: &str) -> String {
    let trimmed = input.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        return String::new();
    }

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(&trimmed);

    // Re-parse behind a fixed scheme so bare domains and full URLs take the
    // same path through the host extraction.
    let host = match Url::parse(&format!("http://{}", without_scheme)) {
        Ok(parsed) => parsed.host_str().unwrap_or("").to_string(),
        Err(_) => without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .to_string(),
    };

    host.strip_prefix("www.").unwrap_or(&host).to_string()
}
