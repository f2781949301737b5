// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::settings::{DelaySettings, TrackingSettings};
use crate::domain::models::{RankOutcome, SearchTask};
use crate::tracker::jitter_secs;
use crate::tracker::resolver::RankResolver;

/// 批次执行器
///
/// 严格串行地逐个处理关键词，关键词之间加入随机的节奏延迟。
/// 中断标志在关键词之间检查，已收集的结果总是被保留。
pub struct BatchRunner {
    resolver: RankResolver,
    delays: DelaySettings,
    interrupt: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(resolver: RankResolver, delays: DelaySettings, interrupt: Arc<AtomicBool>) -> Self {
        Self {
            resolver,
            delays,
            interrupt,
        }
    }

    /// 执行整个批次，返回按执行顺序排列的结果记录
    pub async fn run(&mut self, tracking: &TrackingSettings) -> Vec<RankOutcome> {
        let domain = self.resolver.target().as_str().to_string();
        let total = tracking.keywords.len();
        let mut outcomes = Vec::with_capacity(total);

        info!(
            "Tracking {} keywords for target domain '{}' (max {} pages each)",
            total, domain, tracking.max_pages
        );

        for (index, keyword) in tracking.keywords.iter().enumerate() {
            if self.interrupt.load(Ordering::SeqCst) {
                warn!(
                    "Interrupt received, stopping after {} of {} keywords",
                    index, total
                );
                break;
            }

            let task = SearchTask::new(keyword.clone(), tracking.max_pages, tracking.retries);
            let resolution = self.resolver.run_task(&task).await;

            info!(
                "Result for '{}': rank {}, status {}",
                keyword, resolution.rank, resolution.status
            );

            outcomes.push(RankOutcome {
                timestamp_executed: Utc::now(),
                keyword: keyword.clone(),
                target_domain_checked: domain.clone(),
                rank: resolution.rank,
                status: resolution.status,
                url: resolution.url,
                title: resolution.title,
                page: resolution.page,
            });

            // Pacing between keywords, skipped after the last one.
            if index + 1 < total && !self.interrupt.load(Ordering::SeqCst) {
                let delay = jitter_secs(
                    self.delays.between_keywords_min_secs,
                    self.delays.between_keywords_max_secs,
                );
                info!(
                    "Waiting {:.1}s before the next keyword",
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }
        }

        outcomes
    }

    /// 关闭底层浏览器会话
    pub async fn shutdown(&mut self) {
        self.resolver.close_session().await;
    }
}
