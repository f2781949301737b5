// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::domain::models::ResultEntry;

/// 提取策略表，按优先级排序
///
/// 每条是"定位结果链接锚点"的结构化选择器；第一个产出
/// 非空结果的策略胜出，之后的策略不再参与。结构脆弱性
/// 靠冗余缓解，不做多策略合并。
const STRATEGY_SELECTORS: &[(&str, &str)] = &[
    ("classic-organic", "div.g div.yuRUbf > a"),
    ("stacked-organic", "div.hlcw0c div.yuRUbf > a"),
    ("mobile-card", "div.Gx5Zad .kCrYT > a"),
    ("anchor-with-heading", "div.g a:has(h3)"),
];

static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());

/// 搜索结果提取器
pub struct ResultExtractor {
    strategies: Vec<(&'static str, Selector)>,
}

impl ResultExtractor {
    pub fn new() -> Self {
        let strategies = STRATEGY_SELECTORS
            .iter()
            .map(|(name, selector)| (*name, Selector::parse(selector).unwrap()))
            .collect();
        Self { strategies }
    }

    /// 从渲染后的HTML中提取当前页的结果条目
    ///
    /// 空返回是合法信号（已知结构都不匹配），不是错误；
    /// 由调用方记录告警并按本页零条结果继续。
    pub fn extract(&self, html: &str) -> Vec<ResultEntry> {
        let document = Html::parse_document(html);

        for (name, selector) in &self.strategies {
            let mut entries = Vec::new();

            for link in document.select(selector) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                let Some(url) = clean_href(href) else {
                    continue;
                };
                entries.push(ResultEntry::new(url, resolve_title(link)));
            }

            if !entries.is_empty() {
                info!("使用策略 {} 提取到 {} 条结果", name, entries.len());
                return entries;
            }
            debug!("策略 {} 未命中任何元素", name);
        }

        Vec::new()
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 清理链接地址
///
/// 解开 `/url?q=` 跳转包装，丢弃缓存代理链接和非 http 链接。
/// 缓存镜像不代表被排名的页面本身。
fn clean_href(href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }

    let cleaned = if let Some(rest) = href.strip_prefix("/url?q=") {
        let raw = rest.split('&').next().unwrap_or(rest);
        urlencoding::decode(raw)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    } else {
        href.to_string()
    };

    if !cleaned.starts_with("http") {
        return None;
    }
    if is_cache_proxy(&cleaned) {
        return None;
    }

    Some(cleaned)
}

fn is_cache_proxy(url: &str) -> bool {
    url.contains("webcache.googleusercontent.com") || url.contains("/search?q=cache:")
}

/// 解析条目标题
///
/// 回退链：链接内部的标题元素 → 最近的包含标题的祖先容器
/// （同级兄弟节点下的标题也经由父容器命中）。都找不到时
/// 返回 None，由调用方填充占位标题，条目仍参与排名。
fn resolve_title(link: ElementRef<'_>) -> Option<String> {
    if let Some(title) = first_heading_text(link) {
        return Some(title);
    }

    for node in link.ancestors() {
        if let Some(container) = ElementRef::wrap(node) {
            if let Some(title) = first_heading_text(container) {
                return Some(title);
            }
        }
    }

    None
}

fn first_heading_text(scope: ElementRef<'_>) -> Option<String> {
    scope.select(&HEADING_SELECTOR).next().and_then(|heading| {
        let text = heading.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}
