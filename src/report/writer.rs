// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

use crate::config::settings::ReportSettings;
use crate::domain::models::RankOutcome;

/// 一次批次产出的报告文件
#[derive(Debug)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// 报告写入器
///
/// CSV 面向人工查看，JSON 面向下游程序；两份文件内容等价。
/// 写入失败由调用方记录日志，不会中断批次收尾。
pub struct ReportWriter {
    settings: ReportSettings,
}

impl ReportWriter {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// 持久化批次结果
    ///
    /// 空批次不产生文件。
    pub fn write(&self, outcomes: &[RankOutcome]) -> Result<Option<ReportPaths>> {
        if outcomes.is_empty() {
            info!("No outcomes collected, nothing to persist");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.settings.output_dir)
            .with_context(|| format!("cannot create report dir {}", self.settings.output_dir))?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let base = PathBuf::from(&self.settings.output_dir);
        let csv_path = base.join(format!("{}_{}.csv", self.settings.prefix, stamp));
        let json_path = base.join(format!("{}_{}.json", self.settings.prefix, stamp));

        let mut writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("cannot create {}", csv_path.display()))?;
        for outcome in outcomes {
            writer.serialize(outcome)?;
        }
        writer.flush()?;
        info!("CSV report written to {}", csv_path.display());

        let json_file = std::fs::File::create(&json_path)
            .with_context(|| format!("cannot create {}", json_path.display()))?;
        serde_json::to_writer_pretty(json_file, outcomes)?;
        info!("JSON report written to {}", json_path.display());

        Ok(Some(ReportPaths {
            csv: csv_path,
            json: json_path,
        }))
    }

    /// 在日志中打印批次小结
    pub fn log_summary(outcomes: &[RankOutcome]) {
        info!("--- Batch summary ({} keywords) ---", outcomes.len());
        for outcome in outcomes {
            info!(
                "{} | rank: {} | status: {} | page: {}",
                outcome.keyword, outcome.rank, outcome.status, outcome.page
            );
        }
    }
}
