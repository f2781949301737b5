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

use rankrs::config::settings::Settings;
use rankrs::domain::models::TargetDomain;
use rankrs::engines::chromium_engine::ChromiumFactory;
use rankrs::engines::session::SessionManager;
use rankrs::report::writer::ReportWriter;
use rankrs::tracker::batch::BatchRunner;
use rankrs::tracker::resolver::{RankResolver, ResolverOptions};
use rankrs::utils::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件、执行批次并持久化报告
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting rankrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    let target = TargetDomain::new(&settings.tracking.target_domain)?;
    info!(
        "Target domain: {} | keywords: {} | max pages per keyword: {}",
        target,
        settings.tracking.keywords.len(),
        settings.tracking.max_pages
    );

    // 3. Launch the browser session; failing here is fatal for the batch
    let factory = Arc::new(ChromiumFactory::new(settings.browser.clone()));
    let mut session = SessionManager::new(factory);
    session.open().await?;

    // 4. Wire the resolver and batch runner
    let resolver = RankResolver::new(
        session,
        target,
        ResolverOptions::from_settings(&settings),
    );
    let interrupt = Arc::new(AtomicBool::new(false));
    let mut runner = BatchRunner::new(resolver, settings.delays.clone(), interrupt.clone());

    // 5. Cooperative cancellation: Ctrl-C stops the loop between keywords,
    //    collected outcomes are still flushed below
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current keyword...");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    // 6. Run the batch and always tear the session down afterwards
    let outcomes = runner.run(&settings.tracking).await;
    runner.shutdown().await;

    // 7. Persist whatever was collected
    ReportWriter::log_summary(&outcomes);
    let report_writer = ReportWriter::new(settings.report.clone());
    if let Err(e) = report_writer.write(&outcomes) {
        error!("Failed to persist report: {}", e);
    }

    info!("rankrs finished");
    Ok(())
}
