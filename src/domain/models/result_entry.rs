// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 提取不到标题时写入的占位值，带占位标题的条目仍参与排名
pub const TITLE_UNAVAILABLE: &str = "title not captured";

/// 结果页上的一条搜索结果
///
/// 每次页面扫描的临时产物，排名计数结束后即丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub url: String,
    pub title: String,
}

impl ResultEntry {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: url.into(),
            title: title.unwrap_or_else(|| TITLE_UNAVAILABLE.to_string()),
        }
    }
}
