// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{
    is_session_loss_message, DriverError, DriverFactory, Locator, SearchDriver,
};

/// Chromium 驱动
///
/// 基于 chromiumoxide 实现的浏览器驱动，一个实例对应
/// 一个独占的浏览器进程和单个标签页。
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    poll_interval: Duration,
}

impl ChromiumDriver {
    /// 以固定配置启动一个新的浏览器进程
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(settings.request_timeout_secs));

        if !settings.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            // Images are dead weight for rank scanning.
            .arg("--blink-settings=imagesEnabled=false")
            .arg(format!("--lang={}", settings.lang));

        let config = builder
            .build()
            .map_err(DriverError::InitFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::InitFailed(e.to_string()))?;

        // Drain browser events until the connection drops.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::InitFailed(e.to_string()))?;

        page.set_user_agent(settings.user_agent.as_str())
            .await
            .map_err(|e| DriverError::InitFailed(e.to_string()))?;

        tracing::info!("Chromium session started (headless: {})", settings.headless);

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler_task,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        })
    }

    fn classify(context: &str, err: CdpError) -> DriverError {
        let message = err.to_string();
        if is_session_loss_message(&message) {
            DriverError::SessionLost(format!("{}: {}", context, message))
        } else if message.to_lowercase().contains("timeout") {
            DriverError::Timeout(format!("{}: {}", context, message))
        } else {
            DriverError::Other(format!("{}: {}", context, message))
        }
    }

    /// 执行一段返回布尔值的脚本
    async fn eval_bool(&self, script: String, context: &str) -> Result<bool, DriverError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| Self::classify(context, e))?;

        Ok(result
            .value()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    fn text_probe_script(tag: &str, needle: &str, action: &str) -> String {
        // Needles are static ASCII/CJK literals; debug formatting yields a
        // valid JS string literal for them.
        format!(
            r#"(() => {{
                const el = Array.from(document.querySelectorAll({tag:?}))
                    .find(e => (e.textContent || '').includes({needle:?}));
                if (!el) return false;
                {action}
                return true;
            }})()"#
        )
    }

    async fn css_element_exists(&self, selector: &str) -> Result<bool, DriverError> {
        match self.page.find_element(selector).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let message = e.to_string();
                if is_session_loss_message(&message) {
                    Err(DriverError::SessionLost(message))
                } else {
                    Ok(false)
                }
            }
        }
    }

    async fn locator_exists(&self, locator: &Locator) -> Result<bool, DriverError> {
        match locator {
            Locator::Css(selector) => self.css_element_exists(selector).await,
            Locator::Text { tag, needle } => {
                let script = Self::text_probe_script(tag, needle, "void 0;");
                self.eval_bool(script, "text probe").await
            }
        }
    }
}

#[async_trait]
impl SearchDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| Self::classify("navigate", e))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| Self::classify("current_url", e))?;
        Ok(url.unwrap_or_default())
    }

    async fn content(&self) -> Result<String, DriverError> {
        self.page
            .content()
            .await
            .map_err(|e| Self::classify("content", e))
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<bool, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.locator_exists(locator).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        match locator {
            Locator::Css(selector) => {
                let element = self
                    .page
                    .find_element(*selector)
                    .await
                    .map_err(|e| Self::classify(&format!("find {}", selector), e))?;
                element
                    .click()
                    .await
                    .map_err(|e| Self::classify(&format!("click {}", selector), e))?;
                Ok(())
            }
            Locator::Text { tag, needle } => {
                let script = Self::text_probe_script(tag, needle, "el.click();");
                if self.eval_bool(script, "text click").await? {
                    Ok(())
                } else {
                    Err(DriverError::NotFound(locator.to_string()))
                }
            }
        }
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), DriverError> {
        match locator {
            Locator::Css(selector) => {
                let element = self
                    .page
                    .find_element(*selector)
                    .await
                    .map_err(|e| Self::classify(&format!("find {}", selector), e))?;
                element
                    .scroll_into_view()
                    .await
                    .map_err(|e| Self::classify(&format!("scroll {}", selector), e))?;
                Ok(())
            }
            Locator::Text { tag, needle } => {
                let script = Self::text_probe_script(
                    tag,
                    needle,
                    "el.scrollIntoView({block: 'center'});",
                );
                if self.eval_bool(script, "text scroll").await? {
                    Ok(())
                } else {
                    Err(DriverError::NotFound(locator.to_string()))
                }
            }
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();

        self.page
            .save_screenshot(params, path)
            .await
            .map_err(|e| Self::classify("screenshot", e))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::warn!("Browser close reported an error: {}", e);
        }
        self.handler_task.abort();
        tracing::info!("Chromium session closed");
        Ok(())
    }
}

/// Chromium 驱动工厂
pub struct ChromiumFactory {
    settings: BrowserSettings,
}

impl ChromiumFactory {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DriverFactory for ChromiumFactory {
    async fn launch(&self) -> Result<Arc<dyn SearchDriver>, DriverError> {
        let driver = ChromiumDriver::launch(&self.settings).await?;
        Ok(Arc::new(driver))
    }
}
