// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 驱动错误类型
#[derive(Error, Debug, Clone)]
pub enum DriverError {
    /// 浏览器进程无法启动
    #[error("browser launch failed: {0}")]
    InitFailed(String),
    /// 有界等待超时
    #[error("timed out: {0}")]
    Timeout(String),
    /// 元素不存在
    #[error("element not found: {0}")]
    NotFound(String),
    /// 浏览器会话已丢失
    #[error("browser session lost: {0}")]
    SessionLost(String),
    /// 其他错误
    #[error("driver error: {0}")]
    Other(String),
}

impl DriverError {
    pub fn is_session_loss(&self) -> bool {
        matches!(self, DriverError::SessionLost(_))
    }
}

/// 判断故障消息是否带有会话丢失的特征
///
/// 浏览器进程崩溃后，底层连接类错误的消息各不相同，
/// 只能按已知模式匹配。
pub fn is_session_loss_message(message: &str) -> bool {
    let lowered = message.to_lowercase();

    let markers = [
        "session id is null",
        "target window already closed",
        "browser has been closed",
        "browser closed",
        "connection closed",
        "connection reset",
        "channel closed",
        "oneshot canceled",
        "websocket",
        "ws error",
    ];

    markers.iter().any(|m| lowered.contains(m))
}

/// 元素定位器
///
/// 结构化 CSS 选择器，或按标签加包含文本匹配，
/// 覆盖"下一页"等控件的多语言文案变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Css(&'static str),
    Text {
        tag: &'static str,
        needle: &'static str,
    },
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css({})", selector),
            Locator::Text { tag, needle } => write!(f, "text({}~{:?})", tag, needle),
        }
    }
}

/// 浏览器驱动能力特质
///
/// 排名跟踪核心只依赖这组原语，不绑定具体自动化库。
#[async_trait]
pub trait SearchDriver: Send + Sync {
    /// 导航到指定URL并等待加载
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// 当前导航到的URL
    async fn current_url(&self) -> Result<String, DriverError>;

    /// 当前页面渲染后的HTML
    async fn content(&self) -> Result<String, DriverError>;

    /// 在限定时间内等待定位器命中，超时返回 `Ok(false)`
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<bool, DriverError>;

    /// 点击定位器命中的第一个元素
    async fn click(&self, locator: &Locator) -> Result<(), DriverError>;

    /// 将元素滚动到可视区域
    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), DriverError>;

    /// 截图保存到指定路径
    async fn screenshot(&self, path: &Path) -> Result<(), DriverError>;

    /// 关闭浏览器进程
    async fn close(&self) -> Result<(), DriverError>;
}

/// 驱动工厂特质
///
/// 每次 `launch` 启动一个新的操作系统级浏览器进程，开销以秒计。
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn SearchDriver>, DriverError>;
}
