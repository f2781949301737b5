// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::utils::url_utils::normalize_host;

#[derive(Error, Debug)]
pub enum TargetDomainError {
    #[error("target domain must not be empty")]
    Empty,
}

/// 目标域名
///
/// 构造时即完成规范化，之后作为子串匹配键与页面上发现的
/// 链接主机名比较。链接主机名经过同一个规范化函数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDomain(String);

impl TargetDomain {
    pub fn new(raw: &str) -> Result<Self, TargetDomainError> {
        let normalized = normalize_host(raw);
        if normalized.is_empty() {
            return Err(TargetDomainError::Empty);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 判断给定链接是否命中目标域名
    pub fn matches_url(&self, url: &str) -> bool {
        let host = normalize_host(url);
        !host.is_empty() && host.contains(self.0.as_str())
    }
}

impl std::fmt::Display for TargetDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
