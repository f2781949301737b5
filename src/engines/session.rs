// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::engines::traits::{DriverError, DriverFactory, SearchDriver};

/// 会话管理错误类型
#[derive(Error, Debug)]
pub enum SessionError {
    /// 首次创建会话失败，对整个批次是致命的
    #[error("driver init failed: {0}")]
    InitFailed(DriverError),
    /// 崩溃后的会话重建失败，调用方必须放弃当前任务
    #[error("session restart failed: {0}")]
    RestartFailed(DriverError),
}

/// 会话管理器
///
/// 独占持有至多一个活动的浏览器会话。每次 `open` 都会启动
/// 一个新的浏览器进程，除崩溃恢复外每个关键词不应超过一次。
pub struct SessionManager {
    factory: Arc<dyn DriverFactory>,
    current: Option<Arc<dyn SearchDriver>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn DriverFactory>) -> Self {
        Self {
            factory,
            current: None,
        }
    }

    /// 当前活动会话
    pub fn active(&self) -> Option<Arc<dyn SearchDriver>> {
        self.current.clone()
    }

    /// 启动一个新的浏览器会话
    pub async fn open(&mut self) -> Result<Arc<dyn SearchDriver>, SessionError> {
        if let Some(existing) = &self.current {
            return Ok(existing.clone());
        }

        let driver = self
            .factory
            .launch()
            .await
            .map_err(SessionError::InitFailed)?;
        self.current = Some(driver.clone());
        Ok(driver)
    }

    /// 关闭当前会话
    ///
    /// 幂等；关闭失败只记录日志，绝不向外传播。
    pub async fn close(&mut self) {
        if let Some(driver) = self.current.take() {
            if let Err(e) = driver.close().await {
                warn!("Failed to close browser session: {}", e);
            }
        }
    }

    /// 销毁当前会话并启动一个新会话
    ///
    /// 重建失败返回区分出的 `RestartFailed`，调用方据此放弃
    /// 当前关键词，而不是继续在空会话上操作。
    pub async fn restart(&mut self) -> Result<Arc<dyn SearchDriver>, SessionError> {
        info!("Restarting browser session...");
        self.close().await;

        match self.factory.launch().await {
            Ok(driver) => {
                self.current = Some(driver.clone());
                info!("Browser session restarted");
                Ok(driver)
            }
            Err(e) => {
                error!("Browser session restart failed: {}", e);
                Err(SessionError::RestartFailed(e))
            }
        }
    }
}
