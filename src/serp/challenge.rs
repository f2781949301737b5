// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::settings::ScreenshotSettings;
use crate::engines::traits::{DriverError, SearchDriver};

/// 验证页跳转的URL特征
static CHALLENGE_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"google\.[a-z.]+/sorry").unwrap(),
        Regex::new(r"/sorry/index").unwrap(),
        Regex::new(r"[?&]continue=.*sorry").unwrap(),
    ]
});

/// 验证页的DOM结构特征
static CHALLENGE_DOM_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        Selector::parse("iframe[src*='recaptcha']").unwrap(),
        Selector::parse("form#captcha-form").unwrap(),
    ]
});

/// 验证页的正文文本特征
const CHALLENGE_TEXT_MARKERS: &[&str] = &[
    "unusual traffic",
    "systems have detected unusual traffic",
    "our systems have detected",
];

/// 反爬验证页检测器
///
/// 同一个关键词可能在翻页中途才被拦截，所以每次导航之后
/// 和每页扫描之前都要调用一次。
pub struct ChallengeDetector {
    screenshots: ScreenshotSettings,
}

impl ChallengeDetector {
    pub fn new(screenshots: ScreenshotSettings) -> Self {
        Self { screenshots }
    }

    /// 检查当前页面是否是验证页
    ///
    /// 先比对当前URL，再查DOM标记，命中任意一个即短路返回。
    pub async fn detect(&self, driver: &dyn SearchDriver) -> Result<bool, DriverError> {
        let url = driver.current_url().await?;
        if CHALLENGE_URL_PATTERNS.iter().any(|p| p.is_match(&url)) {
            error!("Challenge page detected by URL: {}", url);
            self.snapshot(driver).await;
            return Ok(true);
        }

        let html = driver.content().await?;
        if Self::html_has_marker(&html) {
            error!("Challenge markers found in page content");
            self.snapshot(driver).await;
            return Ok(true);
        }

        Ok(false)
    }

    fn html_has_marker(html: &str) -> bool {
        let document = Html::parse_document(html);
        if CHALLENGE_DOM_SELECTORS
            .iter()
            .any(|sel| document.select(sel).next().is_some())
        {
            return true;
        }

        let lowered = html.to_lowercase();
        CHALLENGE_TEXT_MARKERS.iter().any(|m| lowered.contains(m))
    }

    /// 保存诊断截图
    ///
    /// 纯尽力而为；截图失败不影响检测结果。
    async fn snapshot(&self, driver: &dyn SearchDriver) {
        if !self.screenshots.enabled {
            return;
        }

        if let Err(e) = std::fs::create_dir_all(&self.screenshots.dir) {
            warn!("Cannot create screenshot dir {}: {}", self.screenshots.dir, e);
            return;
        }

        let filename = format!(
            "captcha_detected_{}.png",
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = PathBuf::from(&self.screenshots.dir).join(filename);

        match driver.screenshot(&path).await {
            Ok(()) => info!("Challenge screenshot saved to {}", path.display()),
            Err(e) => warn!("Challenge screenshot failed: {}", e),
        }
    }
}
