// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::settings::{DelaySettings, ScreenshotSettings, Settings, WaitSettings};
use crate::domain::models::{FaultKind, Rank, RankStatus, ResultEntry, SearchTask, TargetDomain};
use crate::engines::session::SessionManager;
use crate::engines::traits::{DriverError, Locator, SearchDriver};
use crate::serp::challenge::ChallengeDetector;
use crate::serp::consent::ConsentHandler;
use crate::serp::extract::ResultExtractor;
use crate::serp::pagination::PaginationController;
use crate::tracker::{jitter_ms, jitter_secs};
use crate::utils::retry_policy::RetryPolicy;

/// 结果容器出现即认为页面可扫描
const RESULTS_CONTAINER: Locator = Locator::Css("div.g, div.hlcw0c, div.Gx5Zad");

/// 排名解析器的运行参数
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub results_per_page: u32,
    pub search_lang: String,
    pub search_region: String,
    pub waits: WaitSettings,
    pub delays: DelaySettings,
    pub screenshots: ScreenshotSettings,
    pub retry: RetryPolicy,
}

impl ResolverOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            results_per_page: settings.tracking.results_per_page,
            search_lang: settings.browser.search_lang.clone(),
            search_region: settings.browser.search_region.clone(),
            waits: settings.waits.clone(),
            delays: settings.delays.clone(),
            screenshots: settings.screenshots.clone(),
            retry: RetryPolicy::standard(settings.tracking.retries),
        }
    }
}

/// 单次关键词解析的终态
#[derive(Debug, Clone)]
pub struct Resolution {
    pub rank: Rank,
    pub status: RankStatus,
    pub url: Option<String>,
    pub title: Option<String>,
    pub page: u32,
}

impl Resolution {
    pub fn found(rank: u32, entry: &ResultEntry, page: u32) -> Self {
        Self {
            rank: Rank::Position(rank),
            status: RankStatus::Found,
            url: Some(entry.url.clone()),
            title: Some(entry.title.clone()),
            page,
        }
    }

    pub fn not_found(scanned: u32, page: u32) -> Self {
        Self {
            rank: Rank::NotFoundInTop(scanned),
            status: RankStatus::NotFound,
            url: None,
            title: None,
            page,
        }
    }

    pub fn captcha(page: u32) -> Self {
        Self {
            rank: Rank::Captcha,
            status: RankStatus::Captcha,
            url: None,
            title: None,
            page,
        }
    }

    pub fn error(kind: FaultKind) -> Self {
        Self {
            rank: Rank::Error(kind),
            status: RankStatus::Error,
            url: None,
            title: None,
            page: 0,
        }
    }
}

/// 解析过程中的故障，带归类标签
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

impl From<DriverError> for Fault {
    fn from(e: DriverError) -> Self {
        let kind = match &e {
            DriverError::Timeout(_) => FaultKind::Timeout,
            DriverError::SessionLost(_) => FaultKind::SessionLost,
            DriverError::InitFailed(_) | DriverError::NotFound(_) | DriverError::Other(_) => {
                FaultKind::Driver
            }
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

/// 构造搜索请求URL
///
/// 请求的结果数和固定的语言/地区参数都由配置给定，
/// 搜索引擎可能不完全遵守这些参数。
pub fn build_search_url(keyword: &str, result_count: u32, lang: &str, region: &str) -> String {
    let query_params: Vec<(&str, String)> = vec![
        ("q", keyword.to_string()),
        ("num", result_count.to_string()),
        ("hl", lang.to_string()),
        ("gl", region.to_string()),
    ];

    let query_string = query_params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("https://www.google.com/search?{}", query_string)
}

/// 排名解析器
///
/// 驱动一个关键词查询完整走完 搜索 → 同意弹窗 → 逐页扫描
/// 的流程，并实现围绕全过程的重试与会话恢复策略。
pub struct RankResolver {
    session: SessionManager,
    target: TargetDomain,
    opts: ResolverOptions,
    detector: ChallengeDetector,
    extractor: ResultExtractor,
    paginator: PaginationController,
    consent: ConsentHandler,
}

impl RankResolver {
    pub fn new(session: SessionManager, target: TargetDomain, opts: ResolverOptions) -> Self {
        let detector = ChallengeDetector::new(opts.screenshots.clone());
        let paginator = PaginationController::new(Duration::from_secs(opts.waits.probe_secs));
        let consent = ConsentHandler::new(Duration::from_secs(opts.waits.consent_probe_secs));

        Self {
            session,
            target,
            opts,
            detector,
            extractor: ResultExtractor::new(),
            paginator,
            consent,
        }
    }

    pub fn target(&self) -> &TargetDomain {
        &self.target
    }

    /// 关闭当前浏览器会话
    pub async fn close_session(&mut self) {
        self.session.close().await;
    }

    /// 解析一个关键词的排名
    ///
    /// 每个任务恰好产生一个终态，成功或失败都不向外抛错。
    /// 重试总是从搜索URL重新开始，从不在页中间续作。
    pub async fn run_task(&mut self, task: &SearchTask) -> Resolution {
        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                let backoff = self.opts.retry.calculate_backoff(attempt);
                info!(
                    "Retry {}/{} for keyword '{}' after {:.1}s backoff",
                    attempt,
                    task.retries,
                    task.keyword,
                    backoff.as_secs_f64()
                );
                sleep(backoff).await;
            }

            match self.attempt(task).await {
                Ok(resolution) => return resolution,
                Err(fault) => {
                    error!(
                        "Attempt {} for '{}' failed ({}): {}",
                        attempt + 1,
                        task.keyword,
                        fault.kind,
                        fault.message
                    );
                    self.fault_snapshot(&task.keyword, attempt, fault.kind).await;

                    if fault.kind == FaultKind::SessionLost {
                        warn!("Session loss detected, forcing a browser restart");
                        if let Err(e) = self.session.restart().await {
                            error!("Abandoning keyword '{}': {}", task.keyword, e);
                            return Resolution::error(FaultKind::RestartFailed);
                        }
                    }

                    if attempt >= task.retries {
                        return Resolution::error(fault.kind);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// 单次完整的搜索尝试
    async fn attempt(&self, task: &SearchTask) -> Result<Resolution, Fault> {
        let driver = self.session.active().ok_or_else(|| Fault {
            kind: FaultKind::Driver,
            message: "no active browser session".to_string(),
        })?;
        let driver: &dyn SearchDriver = driver.as_ref();

        let url = build_search_url(
            &task.keyword,
            task.max_pages * self.opts.results_per_page,
            &self.opts.search_lang,
            &self.opts.search_region,
        );
        info!("Searching keyword '{}'", task.keyword);
        driver.navigate(&url).await?;

        // 验证页只要出现就立即终态返回，重试只会浪费预算
        if self.detector.detect(driver).await? {
            return Ok(Resolution::captcha(0));
        }

        self.consent.dismiss(driver).await?;

        let present = driver
            .wait_for(
                &RESULTS_CONTAINER,
                Duration::from_secs(self.opts.waits.results_secs),
            )
            .await?;
        if !present {
            return Err(Fault {
                kind: FaultKind::Timeout,
                message: "results container did not appear within the wait budget".to_string(),
            });
        }

        sleep(jitter_ms(
            self.opts.delays.settle_min_ms,
            self.opts.delays.settle_max_ms,
        ))
        .await;

        // 绝对名次跨页连续计数，不随翻页重置
        let mut scanned: u32 = 0;

        for page_num in 1..=task.max_pages {
            info!("Scanning results page {} for '{}'", page_num, task.keyword);

            if self.detector.detect(driver).await? {
                return Ok(Resolution::captcha(page_num));
            }

            let html = driver.content().await?;
            let entries = self.extractor.extract(&html);
            if entries.is_empty() {
                warn!(
                    "Extraction empty on page {} for '{}': no strategy matched the page structure",
                    page_num, task.keyword
                );
            }

            for entry in &entries {
                scanned += 1;
                if self.target.matches_url(&entry.url) {
                    info!(
                        "Target '{}' found for '{}' at rank {} (page {}): {}",
                        self.target, task.keyword, scanned, page_num, entry.url
                    );
                    return Ok(Resolution::found(scanned, entry, page_num));
                }
            }

            if page_num < task.max_pages {
                if self.paginator.advance(driver).await? {
                    sleep(jitter_secs(
                        self.opts.delays.between_pages_min_secs,
                        self.opts.delays.between_pages_max_secs,
                    ))
                    .await;
                } else {
                    info!(
                        "No next page after page {} for '{}', ending early",
                        page_num, task.keyword
                    );
                    return Ok(Resolution::not_found(scanned, page_num));
                }
            }
        }

        info!(
            "Target '{}' not found for '{}' within {} pages ({} entries scanned)",
            self.target, task.keyword, task.max_pages, scanned
        );
        Ok(Resolution::not_found(scanned, task.max_pages))
    }

    /// 故障时的诊断截图，纯尽力而为
    async fn fault_snapshot(&self, keyword: &str, attempt: u32, kind: FaultKind) {
        if !self.opts.screenshots.enabled {
            return;
        }
        let Some(driver) = self.session.active() else {
            return;
        };

        if let Err(e) = std::fs::create_dir_all(&self.opts.screenshots.dir) {
            warn!(
                "Cannot create screenshot dir {}: {}",
                self.opts.screenshots.dir, e
            );
            return;
        }

        let sanitized: String = keyword
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let path = PathBuf::from(&self.opts.screenshots.dir).join(format!(
            "error_{}_{}_{}.png",
            kind.tag(),
            sanitized,
            attempt
        ));

        if let Err(e) = driver.screenshot(&path).await {
            warn!("Fault screenshot failed: {}", e);
        }
    }
}
