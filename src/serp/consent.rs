// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use tracing::info;

use crate::engines::traits::{DriverError, Locator, SearchDriver};
use crate::serp::probe::ClickProbe;

/// 同意弹窗的定位器，按命中概率排序
const CONSENT_LOCATORS: &[Locator] = &[
    Locator::Css("button#L2AGLb"),
    Locator::Css("button#W0wltc"),
    Locator::Text {
        tag: "button",
        needle: "Accept all",
    },
    Locator::Text {
        tag: "button",
        needle: "Reject all",
    },
    Locator::Text {
        tag: "div",
        needle: "I agree",
    },
];

/// Cookie/隐私同意弹窗处理
///
/// 纯尽力而为：没有弹窗不是错误，正常内容可能本来就可达。
pub struct ConsentHandler {
    probe: ClickProbe,
}

impl ConsentHandler {
    pub fn new(probe_wait: Duration) -> Self {
        Self {
            probe: ClickProbe::new("consent", CONSENT_LOCATORS, probe_wait, false),
        }
    }

    /// 尝试关闭同意弹窗，返回是否点击了某个按钮
    pub async fn dismiss(&self, driver: &dyn SearchDriver) -> Result<bool, DriverError> {
        match self.probe.try_first(driver).await? {
            Some(locator) => {
                info!("Consent prompt dismissed via {}", locator);
                // Give the overlay a moment to clear.
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(true)
            }
            None => {
                info!("No consent prompt found, continuing");
                Ok(false)
            }
        }
    }
}
