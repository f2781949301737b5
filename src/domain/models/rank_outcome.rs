// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// 关键词查询的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankStatus {
    Found,
    #[serde(rename = "Not Found")]
    NotFound,
    #[serde(rename = "CAPTCHA")]
    Captcha,
    Error,
}

impl std::fmt::Display for RankStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RankStatus::Found => "Found",
            RankStatus::NotFound => "Not Found",
            RankStatus::Captcha => "CAPTCHA",
            RankStatus::Error => "Error",
        };
        f.write_str(s)
    }
}

/// 终止本次关键词查询的故障类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// 有界等待超时
    Timeout,
    /// 驱动层故障
    Driver,
    /// 浏览器会话丢失
    SessionLost,
    /// 会话丢失后重建失败
    RestartFailed,
    /// 其余未归类故障
    Unclassified,
}

impl FaultKind {
    /// 用于文件名等场景的短标签
    pub fn tag(&self) -> &'static str {
        match self {
            FaultKind::Timeout => "timeout",
            FaultKind::Driver => "webdriver",
            FaultKind::SessionLost => "session_lost",
            FaultKind::RestartFailed => "restart_failed",
            FaultKind::Unclassified => "unexpected",
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FaultKind::Timeout => "Timeout",
            FaultKind::Driver => "WebDriver",
            FaultKind::SessionLost => "Session Lost",
            FaultKind::RestartFailed => "Driver Crash, Restart Failed",
            FaultKind::Unclassified => "Unexpected",
        };
        f.write_str(s)
    }
}

/// 排名结果
///
/// `Found` 时是跨页连续计数的绝对名次，其余情况是带说明的哨兵值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rank {
    Position(u32),
    /// 扫描完 K 条结果仍未命中
    NotFoundInTop(u32),
    Captcha,
    Error(FaultKind),
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Position(n) => write!(f, "{}", n),
            Rank::NotFoundInTop(k) => write!(f, "Not Found in top {}", k),
            Rank::Captcha => f.write_str("CAPTCHA"),
            Rank::Error(kind) => write!(f, "Error - {}", kind),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Rank::Position(n) => serializer.serialize_u32(*n),
            other => serializer.collect_str(other),
        }
    }
}

mod timestamp_format {
    use super::*;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }
}

/// 一个关键词的最终结果记录
///
/// 字段顺序即报告列顺序，产出后不可变。
#[derive(Debug, Clone, Serialize)]
pub struct RankOutcome {
    #[serde(with = "timestamp_format")]
    pub timestamp_executed: DateTime<Utc>,
    pub keyword: String,
    pub target_domain_checked: String,
    pub rank: Rank,
    pub status: RankStatus,
    pub url: Option<String>,
    pub title: Option<String>,
    pub page: u32,
}
