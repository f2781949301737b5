// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tracing::{debug, info};

use crate::engines::traits::{DriverError, Locator, SearchDriver};
use crate::serp::probe::ClickProbe;

/// "下一页"控件的定位器，覆盖常见的标记与文案变体
const NEXT_LOCATORS: &[Locator] = &[
    Locator::Css("a#pnnext"),
    Locator::Css("a[aria-label='Next page']"),
    Locator::Css("a[aria-label='Page suivante']"),
    Locator::Text {
        tag: "span",
        needle: "Next",
    },
    Locator::Text {
        tag: "a",
        needle: "下一页",
    },
];

/// 翻页控制器
pub struct PaginationController {
    probe: ClickProbe,
}

impl PaginationController {
    pub fn new(probe_wait: Duration) -> Self {
        Self {
            // Scroll first: the next control sits at the bottom of the page
            // and may be covered by footers until it is in view.
            probe: ClickProbe::new("pagination", NEXT_LOCATORS, probe_wait, true),
        }
    }

    /// 前往下一页
    ///
    /// 返回 `Ok(false)` 表示在等待预算内没有任何定位器命中，
    /// 这是最后一页的正常终止信号，不是错误。
    pub async fn advance(&self, driver: &dyn SearchDriver) -> Result<bool, DriverError> {
        match self.probe.try_first(driver).await? {
            Some(locator) => {
                info!("Moved to next page via {}", locator);
                Ok(true)
            }
            None => {
                debug!("No next-page control found, treating as last page");
                Ok(false)
            }
        }
    }
}
