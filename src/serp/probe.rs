// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tracing::{debug, warn};

use crate::engines::traits::{DriverError, Locator, SearchDriver};

/// 按优先级探测并点击的通用流程
///
/// 翻页与同意弹窗共用同一套"依次尝试定位器列表，第一个
/// 可点击的即胜出"的控制流，差异只在定位器列表和参数。
pub struct ClickProbe {
    name: &'static str,
    locators: &'static [Locator],
    /// 单个定位器的等待上限
    wait_each: Duration,
    /// 点击前先滚动到可视区域并稳定片刻
    scroll_before_click: bool,
    settle: Duration,
}

impl ClickProbe {
    pub fn new(
        name: &'static str,
        locators: &'static [Locator],
        wait_each: Duration,
        scroll_before_click: bool,
    ) -> Self {
        Self {
            name,
            locators,
            wait_each,
            scroll_before_click,
            settle: Duration::from_millis(300),
        }
    }

    /// 依次尝试定位器，返回成功点击的那一个
    ///
    /// 单个定位器超时或点击失败都算"换下一个"；只有会话丢失
    /// 会中止整个探测并向上传播。
    pub async fn try_first(
        &self,
        driver: &dyn SearchDriver,
    ) -> Result<Option<&'static Locator>, DriverError> {
        for locator in self.locators {
            let present = driver.wait_for(locator, self.wait_each).await?;
            if !present {
                debug!("{}: {} not present within budget", self.name, locator);
                continue;
            }

            if self.scroll_before_click {
                if let Err(e) = driver.scroll_into_view(locator).await {
                    if e.is_session_loss() {
                        return Err(e);
                    }
                    debug!("{}: scroll to {} failed: {}", self.name, locator, e);
                }
                tokio::time::sleep(self.settle).await;
            }

            match driver.click(locator).await {
                Ok(()) => {
                    debug!("{}: clicked {}", self.name, locator);
                    return Ok(Some(locator));
                }
                Err(e) if e.is_session_loss() => return Err(e),
                Err(e) => {
                    // Obstructions and stale elements are not fatal, the
                    // next locator may still land.
                    warn!("{}: click on {} failed: {}", self.name, locator, e);
                    continue;
                }
            }
        }

        Ok(None)
    }
}
