// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含跟踪目标、浏览器、延迟、等待、截图与报告等所有配置项。
/// 配置以显式值的形式注入各组件，不存在进程级可变状态。
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 排名跟踪配置
    pub tracking: TrackingSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 随机延迟配置
    pub delays: DelaySettings,
    /// 有界等待配置
    pub waits: WaitSettings,
    /// 诊断截图配置
    pub screenshots: ScreenshotSettings,
    /// 报告输出配置
    pub report: ReportSettings,
}

/// 排名跟踪配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingSettings {
    /// 目标域名（无需协议前缀和 www）
    pub target_domain: String,
    /// 要跟踪的关键词列表
    pub keywords: Vec<String>,
    /// 每个关键词最多检查的结果页数
    pub max_pages: u32,
    /// 每页结果数的估计值，用于构造请求的结果数参数
    pub results_per_page: u32,
    /// 每个关键词失败后的重试次数
    pub retries: u32,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// User-Agent
    pub user_agent: String,
    /// 是否无头运行
    pub headless: bool,
    /// 浏览器界面语言
    pub lang: String,
    /// 搜索结果语言参数 (hl)
    pub search_lang: String,
    /// 搜索结果地区参数 (gl)
    pub search_region: String,
    /// 单个驱动请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 元素轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

/// 随机延迟配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DelaySettings {
    /// 关键词之间的最小延迟（秒）
    pub between_keywords_min_secs: f64,
    /// 关键词之间的最大延迟（秒）
    pub between_keywords_max_secs: f64,
    /// 结果页之间的最小延迟（秒）
    pub between_pages_min_secs: f64,
    /// 结果页之间的最大延迟（秒）
    pub between_pages_max_secs: f64,
    /// 页面加载后的最小稳定等待（毫秒）
    pub settle_min_ms: u64,
    /// 页面加载后的最大稳定等待（毫秒）
    pub settle_max_ms: u64,
}

/// 有界等待配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WaitSettings {
    /// 等待结果容器出现的上限（秒）
    pub results_secs: u64,
    /// 翻页控件单个定位器的探测上限（秒）
    pub probe_secs: u64,
    /// 同意弹窗单个定位器的探测上限（秒）
    pub consent_probe_secs: u64,
}

/// 诊断截图配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotSettings {
    /// 出错或命中验证页时是否截图
    pub enabled: bool,
    /// 截图输出目录
    pub dir: String,
}

/// 报告输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// 报告输出目录
    pub output_dir: String,
    /// 报告文件名前缀
    pub prefix: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 默认值 → 可选的 config/{default,<env>} 文件 → RANKRS__ 前缀
    /// 环境变量，逐层覆盖。
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default tracking settings
            .set_default("tracking.target_domain", "")?
            .set_default("tracking.keywords", Vec::<String>::new())?
            .set_default("tracking.max_pages", 3)?
            .set_default("tracking.results_per_page", 10)?
            .set_default("tracking.retries", 1)?
            // Default browser settings
            .set_default("browser.user_agent", DEFAULT_USER_AGENT)?
            .set_default("browser.headless", true)?
            .set_default("browser.lang", "en-US")?
            .set_default("browser.search_lang", "en")?
            .set_default("browser.search_region", "us")?
            .set_default("browser.request_timeout_secs", 30)?
            .set_default("browser.poll_interval_ms", 250)?
            // Default delay settings
            .set_default("delays.between_keywords_min_secs", 5.0)?
            .set_default("delays.between_keywords_max_secs", 10.0)?
            .set_default("delays.between_pages_min_secs", 2.0)?
            .set_default("delays.between_pages_max_secs", 5.0)?
            .set_default("delays.settle_min_ms", 1000)?
            .set_default("delays.settle_max_ms", 2000)?
            // Default wait settings
            .set_default("waits.results_secs", 15)?
            .set_default("waits.probe_secs", 5)?
            .set_default("waits.consent_probe_secs", 3)?
            // Default screenshot settings
            .set_default("screenshots.enabled", true)?
            .set_default("screenshots.dir", "screenshots")?
            // Default report settings
            .set_default("report.output_dir", ".")?
            .set_default("report.prefix", "rank_report")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("RANKRS").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracking.target_domain.trim().is_empty() {
            return Err(ConfigError::Message(
                "tracking.target_domain must not be empty".to_string(),
            ));
        }
        if self.tracking.max_pages == 0 {
            return Err(ConfigError::Message(
                "tracking.max_pages must be at least 1".to_string(),
            ));
        }
        if self.delays.between_keywords_min_secs > self.delays.between_keywords_max_secs
            || self.delays.between_pages_min_secs > self.delays.between_pages_max_secs
            || self.delays.settle_min_ms > self.delays.settle_max_ms
        {
            return Err(ConfigError::Message(
                "delay ranges must satisfy min <= max".to_string(),
            ));
        }
        Ok(())
    }
}
